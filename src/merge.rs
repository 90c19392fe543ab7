//! Merge of a freshly rendered block into existing file text.
//!
//! [`plan`] decides what happens from the located block, the requested
//! position and `force`; [`merge`] carries the decision out on the text.

use crate::locate::{ExistingPosition, Location};
use crate::options::{Options, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No block yet; prepend.
    InsertTop,
    /// No block yet; append after one blank line.
    InsertBottom,
    /// Swap the old block for the new one where it stands.
    Replace,
    /// Forced move of a leading block to the bottom.
    MoveToBottom,
    /// Forced move of a trailing block to the top.
    MoveToTop,
}

pub fn plan(existing: ExistingPosition, requested: Position, force: bool) -> Action {
    use ExistingPosition as E;

    match (existing, requested, force) {
        (E::None, Position::Before, _) => Action::InsertTop,
        (E::None, Position::After, _) => Action::InsertBottom,
        (E::Before, _, false) | (E::After, _, false) => Action::Replace,
        (E::Before, Position::Before, true) | (E::After, Position::After, true) => {
            Action::Replace
        }
        (E::Before, Position::After, true) => Action::MoveToBottom,
        (E::After, Position::Before, true) => Action::MoveToTop,
    }
}

/// Compute the new text for `text` once `block` is placed per `options`.
pub fn merge(text: &str, location: &Location, block: &str, options: &Options) -> String {
    let action = plan(location.position, options.position, options.force);
    tracing::debug!(?action, existing = ?location.position, "Merging annotation");

    match action {
        Action::InsertTop => format!("{}{}", block, text),
        Action::InsertBottom => append_block(text, block),
        Action::Replace => {
            let mut out = String::with_capacity(text.len() + block.len());
            out.push_str(&text[..location.span.start]);
            out.push_str(block);
            out.push_str(&text[location.span.end..]);
            out
        }
        Action::MoveToBottom => append_block(&text[location.span.end..], block),
        Action::MoveToTop => format!(
            "{}{}{}",
            block,
            before_trailing_block(text, location),
            &text[location.span.end..]
        ),
    }
}

/// Remove the located block. Text without a block comes back unchanged.
pub fn strip(text: &str, location: &Location) -> String {
    match location.position {
        ExistingPosition::None => text.to_string(),
        ExistingPosition::Before => text[location.span.end..].to_string(),
        ExistingPosition::After => format!(
            "{}{}",
            before_trailing_block(text, location),
            &text[location.span.end..]
        ),
    }
}

// One blank line between content and block; none on empty content.
fn append_block(content: &str, block: &str) -> String {
    if content.is_empty() {
        return block.to_string();
    }

    let separator = if content.ends_with('\n') { "\n" } else { "\n\n" };
    format!("{}{}{}", content, separator, block)
}

// Content ahead of a trailing block, minus the blank line that separated them.
fn before_trailing_block<'a>(text: &'a str, location: &Location) -> &'a str {
    let content = &text[..location.span.start];
    for separator in ["\r\n", "\n"] {
        if let Some(rest) = content.strip_suffix(separator) {
            if rest.ends_with('\n') || rest.is_empty() {
                return rest;
            }
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::locate;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "== Schema Info";
    const OLD: &str = "# == Schema Info\n#\n#  id :integer\n#\n";
    const NEW: &str = "# == Schema Info\n#\n#  id   :integer\n#  name :string\n#\n";
    const CONTENT: &str = "class User < ActiveRecord::Base\nend\n";

    fn options(position: Position, force: bool) -> Options {
        Options {
            position,
            force,
            ..Options::default()
        }
    }

    fn run(text: &str, block: &str, position: Position, force: bool) -> String {
        let location = locate(text, HEADER, "#");
        merge(text, &location, block, &options(position, force))
    }

    #[test]
    fn test_plan_table() {
        use ExistingPosition as E;

        assert_eq!(plan(E::None, Position::Before, false), Action::InsertTop);
        assert_eq!(plan(E::None, Position::Before, true), Action::InsertTop);
        assert_eq!(plan(E::None, Position::After, false), Action::InsertBottom);
        assert_eq!(plan(E::None, Position::After, true), Action::InsertBottom);
        assert_eq!(plan(E::Before, Position::Before, false), Action::Replace);
        assert_eq!(plan(E::Before, Position::After, false), Action::Replace);
        assert_eq!(plan(E::Before, Position::Before, true), Action::Replace);
        assert_eq!(plan(E::Before, Position::After, true), Action::MoveToBottom);
        assert_eq!(plan(E::After, Position::After, false), Action::Replace);
        assert_eq!(plan(E::After, Position::Before, false), Action::Replace);
        assert_eq!(plan(E::After, Position::After, true), Action::Replace);
        assert_eq!(plan(E::After, Position::Before, true), Action::MoveToTop);
    }

    #[test]
    fn test_insert_top() {
        assert_eq!(run(CONTENT, NEW, Position::Before, false), format!("{}{}", NEW, CONTENT));
    }

    #[test]
    fn test_insert_bottom() {
        assert_eq!(
            run(CONTENT, NEW, Position::After, false),
            format!("{}\n{}", CONTENT, NEW)
        );
    }

    #[test]
    fn test_insert_bottom_empty_content() {
        assert_eq!(run("", NEW, Position::After, false), NEW);
    }

    #[test]
    fn test_insert_bottom_without_final_newline() {
        assert_eq!(
            run("class User; end", NEW, Position::After, false),
            format!("class User; end\n\n{}", NEW)
        );
    }

    #[test]
    fn test_before_retained_without_force() {
        let text = format!("{}{}", OLD, CONTENT);
        assert_eq!(run(&text, NEW, Position::After, false), format!("{}{}", NEW, CONTENT));
    }

    #[test]
    fn test_before_moved_with_force() {
        let text = format!("{}{}", OLD, CONTENT);
        assert_eq!(
            run(&text, NEW, Position::After, true),
            format!("{}\n{}", CONTENT, NEW)
        );
    }

    #[test]
    fn test_after_retained_without_force() {
        let text = format!("{}\n{}", CONTENT, OLD);
        assert_eq!(
            run(&text, NEW, Position::Before, false),
            format!("{}\n{}", CONTENT, NEW)
        );
    }

    #[test]
    fn test_after_moved_with_force() {
        let text = format!("{}\n{}", CONTENT, OLD);
        assert_eq!(run(&text, NEW, Position::Before, true), format!("{}{}", NEW, CONTENT));
    }

    #[test]
    fn test_forced_same_position_replaces_in_place() {
        let text = format!("{}\n{}\n", CONTENT, OLD);
        assert_eq!(
            run(&text, NEW, Position::After, true),
            format!("{}\n{}\n", CONTENT, NEW)
        );
    }

    #[test]
    fn test_idempotent() {
        for position in [Position::Before, Position::After] {
            for force in [false, true] {
                let once = run(CONTENT, NEW, position, force);
                let twice = run(&once, NEW, position, force);
                assert_eq!(once, twice, "position={:?} force={}", position, force);
            }
        }
    }

    #[test]
    fn test_round_trip_moves_restore_content() {
        let top = run(CONTENT, NEW, Position::Before, false);
        let bottom = run(&top, NEW, Position::After, true);
        let back = run(&bottom, NEW, Position::Before, true);

        assert_eq!(back, top);
    }

    #[test]
    fn test_strip() {
        let top = format!("{}{}", OLD, CONTENT);
        let bottom = format!("{}\n{}", CONTENT, OLD);

        assert_eq!(strip(&top, &locate(&top, HEADER, "#")), CONTENT);
        assert_eq!(strip(&bottom, &locate(&bottom, HEADER, "#")), CONTENT);
        assert_eq!(strip(CONTENT, &Location::none()), CONTENT);
    }

    #[test]
    fn test_move_to_top_keeps_trailing_blank_lines() {
        let text = format!("{}\n{}\n\n", CONTENT, OLD);
        assert_eq!(
            run(&text, NEW, Position::Before, true),
            format!("{}{}\n\n", NEW, CONTENT)
        );
    }

    #[test]
    fn test_strip_keeps_trailing_blank_lines() {
        let text = format!("{}\n{}\n", CONTENT, OLD);
        assert_eq!(
            strip(&text, &locate(&text, HEADER, "#")),
            format!("{}\n", CONTENT)
        );
    }

    #[test]
    fn test_strip_block_only_file() {
        assert_eq!(strip(OLD, &locate(OLD, HEADER, "#")), "");
    }
}

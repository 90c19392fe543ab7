//! SQL parser for schema dumps: CREATE TABLE, CREATE INDEX and
//! ALTER TABLE ... ADD CONSTRAINT.

use super::dialect::Dialect;
use super::lexer::{Lexer, Token};
use super::types::map_type;
use crate::schema::{Column, ForeignKey, Index, ReferentialAction, Table};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlParseError {
    #[error("Expected {expected}, found {found:?}")]
    Expected { expected: &'static str, found: Token },
}

/// Parse a SQL dump into table descriptions, in creation order.
pub fn parse_sql(input: &str, dialect: Dialect) -> Result<Vec<Table>, SqlParseError> {
    let dialect = dialect.resolve(input);
    tracing::debug!(?dialect, "Parsing SQL schema");

    let tokens = Lexer::new(input).tokenize();
    let mut parser = Parser::new(tokens, dialect);
    parser.parse()?;

    Ok(parser.tables.into_iter().map(TableDraft::finish).collect())
}

/// Constraint clauses, whether written inline, in the table body or in an
/// ALTER TABLE.
#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    PrimaryKey(Vec<String>),
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    Index {
        name: Option<String>,
        columns: Vec<String>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        target: String,
        target_columns: Vec<String>,
        on_delete: Option<ReferentialAction>,
        on_update: Option<ReferentialAction>,
    },
}

struct TableDraft {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<String>,
    indexes: Vec<Index>,
    foreign_keys: Vec<ForeignKey>,
}

impl TableDraft {
    fn new(name: String) -> Self {
        Self {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    fn apply(&mut self, constraint: Constraint) {
        match constraint {
            Constraint::PrimaryKey(columns) => {
                for column in columns {
                    if !self.primary_key.contains(&column) {
                        self.primary_key.push(column);
                    }
                }
            }
            Constraint::Unique { name, columns } => {
                let name = name.unwrap_or_else(|| format!("{}_{}_key", self.name, columns.join("_")));
                self.add_index(Index::new(name, columns, true));
            }
            Constraint::Index { name, columns } => {
                let name = name.unwrap_or_else(|| format!("{}_{}_idx", self.name, columns.join("_")));
                self.add_index(Index::new(name, columns, false));
            }
            Constraint::ForeignKey {
                name,
                columns,
                target,
                target_columns,
                on_delete,
                on_update,
            } => {
                let Some(column) = columns.first() else {
                    return;
                };
                if columns.len() > 1 {
                    tracing::debug!(table = %self.name, ?columns, "Keeping first column of composite foreign key");
                }
                let name = name.unwrap_or_else(|| format!("{}_{}_fkey", self.name, column));
                let referenced = target_columns.first().map_or("id", String::as_str);

                let mut fk = ForeignKey::new(name, column.as_str(), target, referenced);
                if let Some(action) = on_delete {
                    fk = fk.on_delete(action);
                }
                if let Some(action) = on_update {
                    fk = fk.on_update(action);
                }
                self.foreign_keys.push(fk);
            }
        }
    }

    fn add_index(&mut self, index: Index) {
        if !self.indexes.iter().any(|i| i.name() == index.name()) {
            self.indexes.push(index);
        }
    }

    fn finish(self) -> Table {
        // Key columns are implicitly NOT NULL.
        let columns = self
            .columns
            .into_iter()
            .map(|c| {
                if self.primary_key.iter().any(|k| k == c.name()) {
                    c.not_null()
                } else {
                    c
                }
            })
            .collect();

        let primary_key = match self.primary_key.as_slice() {
            [single] => Some(single.as_str()),
            _ => None,
        };

        Table::new(self.name, primary_key, columns)
            .with_indexes(self.indexes)
            .with_foreign_keys(self.foreign_keys)
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    dialect: Dialect,
    tables: Vec<TableDraft>,
}

impl Parser {
    fn new(tokens: Vec<Token>, dialect: Dialect) -> Self {
        Self {
            tokens,
            pos: 0,
            dialect,
            tables: Vec::new(),
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.current().is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn table_mut(&mut self, name: &str) -> Option<&mut TableDraft> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    fn parse(&mut self) -> Result<(), SqlParseError> {
        while self.current() != &Token::Eof {
            match self.current() {
                Token::Create => {
                    self.advance();
                    self.parse_create()?;
                }
                Token::Alter => {
                    self.advance();
                    self.parse_alter_table()?;
                }
                _ => self.skip_statement(),
            }
        }
        Ok(())
    }

    fn parse_create(&mut self) -> Result<(), SqlParseError> {
        let unique = self.eat(&Token::Unique);

        // TEMPORARY, UNLOGGED and friends
        while matches!(self.current(), Token::Ident(_)) {
            self.advance();
        }

        match self.current() {
            Token::Table if !unique => {
                self.advance();
                self.skip_if_not_exists();
                self.parse_create_table()
            }
            Token::Index => {
                self.advance();
                self.parse_create_index(unique);
                Ok(())
            }
            _ => {
                tracing::trace!(token = ?self.current(), "Skipping CREATE statement");
                self.skip_statement();
                Ok(())
            }
        }
    }

    fn skip_if_not_exists(&mut self) {
        if self.eat(&Token::If) {
            self.eat(&Token::Not);
            self.eat(&Token::Exists);
        }
    }

    /// `name` or `schema.name`; the schema part is dropped.
    fn parse_qualified_name(&mut self) -> Option<String> {
        let Token::Ident(first) = self.current().clone() else {
            return None;
        };
        self.advance();

        let mut name = first;
        while self.current() == &Token::Dot {
            self.advance();
            if let Token::Ident(part) = self.current().clone() {
                self.advance();
                name = part;
            }
        }
        Some(name)
    }

    fn parse_create_table(&mut self) -> Result<(), SqlParseError> {
        let Some(name) = self.parse_qualified_name() else {
            self.skip_statement();
            return Ok(());
        };
        if !self.eat(&Token::LParen) {
            self.skip_statement();
            return Ok(());
        }

        tracing::debug!(table = %name, "Parsing CREATE TABLE");
        let mut draft = TableDraft::new(name);

        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof | Token::Semicolon => break,
                Token::Comma => self.advance(),
                Token::Ident(_) => {
                    let (column, constraints) = self.parse_column()?;
                    draft.columns.push(column);
                    for constraint in constraints {
                        draft.apply(constraint);
                    }
                }
                _ => {
                    if let Some(constraint) = self.parse_table_constraint()? {
                        draft.apply(constraint);
                    }
                }
            }
        }

        // Table options (ENGINE=, WITH (...), ...)
        self.skip_statement();
        self.tables.push(draft);
        Ok(())
    }

    /// Parse a constraint clause; `None` for clauses that carry nothing we
    /// describe (CHECK, EXCLUDE, ...).
    fn parse_table_constraint(&mut self) -> Result<Option<Constraint>, SqlParseError> {
        let name = if self.eat(&Token::Constraint) {
            self.parse_qualified_name()
        } else {
            None
        };

        let constraint = match self.current() {
            Token::Primary => {
                self.advance();
                self.eat(&Token::Key);
                Some(Constraint::PrimaryKey(self.parse_name_list()))
            }
            Token::Unique => {
                self.advance();
                if !self.eat(&Token::Key) {
                    self.eat(&Token::Index);
                }
                let name = name.or_else(|| self.parse_qualified_name());
                Some(Constraint::Unique {
                    name,
                    columns: self.parse_name_list(),
                })
            }
            Token::Key | Token::Index => {
                self.advance();
                let name = self.parse_qualified_name();
                Some(Constraint::Index {
                    name,
                    columns: self.parse_name_list(),
                })
            }
            Token::Foreign => {
                self.advance();
                self.eat(&Token::Key);
                let columns = self.parse_name_list();
                if !self.eat(&Token::References) {
                    self.skip_clause();
                    return Ok(None);
                }
                let (target, target_columns) = self.parse_reference()?;
                let (on_delete, on_update) = self.parse_referential_actions();
                Some(Constraint::ForeignKey {
                    name,
                    columns,
                    target,
                    target_columns,
                    on_delete,
                    on_update,
                })
            }
            _ => None,
        };

        // Trailing clause noise (USING INDEX, DEFERRABLE, CHECK bodies, ...)
        self.skip_clause();
        Ok(constraint)
    }

    fn parse_column(&mut self) -> Result<(Column, Vec<Constraint>), SqlParseError> {
        let name = match self.current() {
            Token::Ident(n) => n.clone(),
            found => {
                return Err(SqlParseError::Expected {
                    expected: "column name",
                    found: found.clone(),
                });
            }
        };
        self.advance();

        let raw_type = self.collect_type();
        let (ty, limit) = map_type(&raw_type, self.dialect);
        let mut column = Column::new(name.as_str(), ty);
        if let Some(limit) = limit {
            column = column.with_limit(limit);
        }

        let mut constraints = Vec::new();
        let mut constraint_name = None;

        loop {
            match self.current() {
                Token::Comma | Token::RParen | Token::Semicolon | Token::Eof => break,
                Token::Not => {
                    self.advance();
                    if self.eat(&Token::Null) {
                        column = column.not_null();
                    }
                }
                Token::Default => {
                    self.advance();
                    if let Some(value) = self.parse_default_value() {
                        column = column.with_default(value);
                    }
                }
                Token::Primary => {
                    self.advance();
                    self.eat(&Token::Key);
                    constraints.push(Constraint::PrimaryKey(vec![name.clone()]));
                }
                Token::Unique => {
                    self.advance();
                    self.eat(&Token::Key);
                    constraints.push(Constraint::Unique {
                        name: constraint_name.take(),
                        columns: vec![name.clone()],
                    });
                }
                Token::References => {
                    self.advance();
                    let (target, target_columns) = self.parse_reference()?;
                    let (on_delete, on_update) = self.parse_referential_actions();
                    constraints.push(Constraint::ForeignKey {
                        name: constraint_name.take(),
                        columns: vec![name.clone()],
                        target,
                        target_columns,
                        on_delete,
                        on_update,
                    });
                }
                Token::Constraint => {
                    self.advance();
                    constraint_name = self.parse_qualified_name();
                }
                Token::Collate => {
                    self.advance();
                    self.parse_qualified_name();
                }
                Token::LParen => self.skip_parenthesized(),
                // NULL, AUTO_INCREMENT, GENERATED ..., CHECK, casts
                _ => self.advance(),
            }
        }

        Ok((column, constraints))
    }

    /// Gather the words of a column type, e.g. `character varying(255)`.
    fn collect_type(&mut self) -> String {
        let mut raw = String::new();
        loop {
            match self.current().clone() {
                Token::Ident(word) => {
                    if !raw.is_empty() {
                        raw.push(' ');
                    }
                    raw.push_str(&word);
                    self.advance();
                }
                Token::LParen => {
                    raw.push('(');
                    self.advance();
                    let mut depth = 1;
                    while depth > 0 {
                        match self.current().clone() {
                            Token::LParen => depth += 1,
                            Token::RParen => depth -= 1,
                            Token::Num(n) | Token::Ident(n) => raw.push_str(&n),
                            Token::Comma => raw.push(','),
                            Token::Eof => break,
                            _ => {}
                        }
                        self.advance();
                    }
                    raw.push(')');
                }
                _ => break,
            }
        }
        raw
    }

    fn parse_default_value(&mut self) -> Option<String> {
        let value = match self.current().clone() {
            Token::Str(s) => {
                self.advance();
                s
            }
            Token::Num(n) => {
                self.advance();
                n
            }
            Token::Null => {
                self.advance();
                return None;
            }
            Token::Ident(word) => {
                self.advance();
                if self.current() == &Token::LParen {
                    let args = self.collect_parenthesized();
                    // Sequence defaults are the auto-increment, not a value.
                    if word.eq_ignore_ascii_case("nextval") {
                        return None;
                    }
                    format!("{}({})", word, args)
                } else {
                    word
                }
            }
            Token::LParen => format!("({})", self.collect_parenthesized()),
            _ => return None,
        };
        Some(value)
    }

    /// Consume a parenthesized group, returning its inner text.
    fn collect_parenthesized(&mut self) -> String {
        self.advance();
        let mut parts = Vec::new();
        let mut depth = 1;

        loop {
            match self.current().clone() {
                Token::LParen => {
                    depth += 1;
                    parts.push("(".to_string());
                }
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                    parts.push(")".to_string());
                }
                Token::Ident(s) | Token::Num(s) => parts.push(s),
                Token::Str(s) => parts.push(format!("'{}'", s)),
                Token::Comma => parts.push(",".to_string()),
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }

        parts.join(" ")
    }

    fn parse_reference(&mut self) -> Result<(String, Vec<String>), SqlParseError> {
        let Some(target) = self.parse_qualified_name() else {
            return Err(SqlParseError::Expected {
                expected: "referenced table",
                found: self.current().clone(),
            });
        };
        Ok((target, self.parse_name_list()))
    }

    fn parse_referential_actions(
        &mut self,
    ) -> (Option<ReferentialAction>, Option<ReferentialAction>) {
        let mut on_delete = None;
        let mut on_update = None;

        while self.current() == &Token::On {
            self.advance();
            let is_delete = match self.current() {
                Token::Delete => true,
                Token::Update => false,
                _ => break,
            };
            self.advance();

            let action = self.parse_action();
            if is_delete {
                on_delete = action;
            } else {
                on_update = action;
            }
        }

        (on_delete, on_update)
    }

    // NO ACTION and SET DEFAULT are reported as no action.
    fn parse_action(&mut self) -> Option<ReferentialAction> {
        if self.eat(&Token::Cascade) {
            return Some(ReferentialAction::Cascade);
        }
        if self.eat(&Token::Restrict) {
            return Some(ReferentialAction::Restrict);
        }
        if self.eat_word("set") {
            if self.eat(&Token::Null) {
                return Some(ReferentialAction::Nullify);
            }
            self.eat(&Token::Default);
            return None;
        }
        if self.eat_word("no") {
            self.eat_word("action");
        }
        None
    }

    /// `(a, b DESC, lower(c))` -> `[a, b, lower]`: the leading word of each
    /// element.
    fn parse_name_list(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        if !self.eat(&Token::LParen) {
            return names;
        }

        let mut expecting_name = true;
        loop {
            match self.current().clone() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => break,
                Token::Comma => {
                    expecting_name = true;
                    self.advance();
                }
                Token::Ident(name) if expecting_name => {
                    names.push(name);
                    expecting_name = false;
                    self.advance();
                }
                Token::LParen => self.skip_parenthesized(),
                _ => self.advance(),
            }
        }
        names
    }

    fn parse_create_index(&mut self, unique: bool) {
        // [CONCURRENTLY] [IF NOT EXISTS] name ON [ONLY] table [USING m] (cols)
        let mut name = None;
        while !matches!(self.current(), Token::On | Token::Semicolon | Token::Eof) {
            match self.current().clone() {
                Token::Ident(word) if !word.eq_ignore_ascii_case("concurrently") => {
                    name = Some(word);
                }
                _ => {}
            }
            self.advance();
        }

        if !self.eat(&Token::On) {
            self.skip_statement();
            return;
        }
        self.eat(&Token::Only);
        let Some(table) = self.parse_qualified_name() else {
            self.skip_statement();
            return;
        };
        while !matches!(self.current(), Token::LParen | Token::Semicolon | Token::Eof) {
            self.advance();
        }
        let columns = self.parse_name_list();
        self.skip_statement();

        tracing::debug!(%table, ?name, unique, "Parsed CREATE INDEX");
        let constraint = if unique {
            Constraint::Unique { name, columns }
        } else {
            Constraint::Index { name, columns }
        };
        match self.table_mut(&table) {
            Some(draft) => draft.apply(constraint),
            None => tracing::trace!(%table, "Index on unknown table"),
        }
    }

    fn parse_alter_table(&mut self) -> Result<(), SqlParseError> {
        if !self.eat(&Token::Table) {
            self.skip_statement();
            return Ok(());
        }
        self.skip_if_not_exists();
        self.eat(&Token::Only);

        let Some(table) = self.parse_qualified_name() else {
            self.skip_statement();
            return Ok(());
        };

        // MySQL dumps chain several ADD clauses in one statement.
        while self.eat(&Token::Add) {
            if let Some(constraint) = self.parse_table_constraint()? {
                tracing::debug!(%table, ?constraint, "Parsed ALTER TABLE constraint");
                match self.table_mut(&table) {
                    Some(draft) => draft.apply(constraint),
                    None => tracing::trace!(%table, "Constraint on unknown table"),
                }
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }

        self.skip_statement();
        Ok(())
    }

    fn skip_parenthesized(&mut self) {
        if !self.eat(&Token::LParen) {
            self.advance();
            return;
        }
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to the end of the current element: the next top-level comma or
    /// closing parenthesis, or the end of the statement.
    fn skip_clause(&mut self) {
        while !matches!(
            self.current(),
            Token::Comma | Token::RParen | Token::Semicolon | Token::Eof
        ) {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }

    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
        self.eat(&Token::Semicolon);
    }
}

pub mod annotate;
pub mod error;
pub mod loader;
pub mod locate;
pub mod measure;
pub mod merge;
pub mod options;
pub mod render;
pub mod schema;
pub mod sql;

use wasm_bindgen::prelude::*;

pub use annotate::{Outcome, annotate_text, remove_annotation_text};
pub use error::AnnotateError;
pub use options::{Options, Position};
pub use schema::{Column, ColumnType, ForeignKey, Index, ReferentialAction, Table};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn parse_options(options_json: Option<String>) -> Result<Options, JsValue> {
    match options_json.as_deref() {
        Some(json) => serde_json::from_str(json).map_err(js_error),
        None => Ok(Options::default()),
    }
}

/// Annotate source text with the block for a JSON table description
#[wasm_bindgen(js_name = "annotateSource")]
pub fn annotate_source(
    source: &str,
    table_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let table: Table = serde_json::from_str(table_json).map_err(js_error)?;
    annotate_text(source, &table, &options).map_err(js_error)
}

/// Remove the annotation block from source text
#[wasm_bindgen(js_name = "removeAnnotation")]
pub fn remove_annotation(source: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    Ok(remove_annotation_text(source, &options))
}

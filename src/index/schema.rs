//! Document schema for indexed customers.
//!
//! Two fields: the customer key as a single untokenized term, and the full
//! name tokenized into lower-cased words. Both are stored so search hits can
//! be projected without going back to the record source.

use crate::error::{SearchError, SearchResult};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{
    LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer, TokenStream,
};
use tantivy::Index;

/// Field name of the exact-match customer key.
pub const CUSTOMER_KEY_FIELD: &str = "customer_key";

/// Field name of the tokenized full name.
pub const FULL_NAME_FIELD: &str = "full_name";

/// Analyzer used for `full_name` at index time and by the query parser.
pub const NAME_ANALYZER: &str = "customer_name";

/// Tokens longer than this are dropped by the analyzer.
const MAX_TOKEN_LEN: usize = 40;

#[derive(Clone, Copy, Debug)]
pub struct CustomerFields {
    pub key: Field,
    pub full_name: Field,
}

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    let name_options = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(NAME_ANALYZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
        .set_stored();

    schema_builder.add_text_field(CUSTOMER_KEY_FIELD, STRING | STORED);
    schema_builder.add_text_field(FULL_NAME_FIELD, name_options);
    schema_builder.build()
}

pub fn fields_from_schema(schema: &Schema) -> SearchResult<CustomerFields> {
    let get = |name: &str| {
        schema
            .get_field(name)
            .map_err(|_| SearchError::StoreUnavailable(format!("schema missing {}", name)))
    };
    Ok(CustomerFields {
        key: get(CUSTOMER_KEY_FIELD)?,
        full_name: get(FULL_NAME_FIELD)?,
    })
}

/// Build the lower-casing word analyzer shared by indexing and querying.
pub fn name_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .build()
}

/// Register the name analyzer on an index. Must run before any writer or
/// query parser touches `full_name`.
pub fn register_analyzer(index: &Index) {
    index.tokenizers().register(NAME_ANALYZER, name_analyzer());
}

/// Split text into the terms the index stores for it.
pub fn analyze(text: &str) -> Vec<String> {
    let mut analyzer = name_analyzer();
    let mut stream = analyzer.token_stream(text);
    let mut terms = Vec::new();
    while stream.advance() {
        terms.push(stream.token().text.clone());
    }
    terms
}

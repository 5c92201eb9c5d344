use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

use crate::DictionaryError;

/// Field decoder that turns `null` and values of the wrong type into the
/// field's default, so only unparseable bytes fail a decode.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Top-level envelope returned by the entries endpoint.
///
/// Every field defaults when absent, so a reply such as `{"id": ""}` or a
/// provider error body decodes fine. An empty `id` means the word was not found.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DictionaryResponse {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub word: String,
    #[serde(deserialize_with = "lenient")]
    pub metadata: Metadata,
    #[serde(deserialize_with = "lenient")]
    pub results: Vec<HeadwordEntry>,
    /// Message the provider sends instead of results on 4xx replies.
    #[serde(deserialize_with = "lenient")]
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(deserialize_with = "lenient")]
    pub operation: String,
    #[serde(deserialize_with = "lenient")]
    pub provider: String,
    #[serde(deserialize_with = "lenient")]
    pub schema: String,
}

/// One result for the queried word.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeadwordEntry {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub language: String,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: String,
    #[serde(deserialize_with = "lenient")]
    pub word: String,
    #[serde(deserialize_with = "lenient")]
    pub lexical_entries: Vec<LexicalEntry>,
}

/// Dictionary content grouped by part of speech.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LexicalEntry {
    #[serde(deserialize_with = "lenient")]
    pub language: String,
    #[serde(deserialize_with = "lenient")]
    pub text: String,
    #[serde(deserialize_with = "lenient")]
    pub lexical_category: LexicalCategory,
    #[serde(deserialize_with = "lenient")]
    pub entries: Vec<Entry>,
    #[serde(deserialize_with = "lenient")]
    pub pronunciations: Vec<Pronunciation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LexicalCategory {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Entry {
    #[serde(deserialize_with = "lenient")]
    pub etymologies: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub senses: Vec<Sense>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sense {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub definitions: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub short_definitions: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub examples: Vec<Example>,
    #[serde(deserialize_with = "lenient")]
    pub thesaurus_links: Vec<ThesaurusLink>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Example {
    #[serde(deserialize_with = "lenient")]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThesaurusLink {
    #[serde(rename = "entry_id", alias = "entryId", deserialize_with = "lenient")]
    pub entry_id: String,
    #[serde(rename = "sense_id", alias = "senseId", deserialize_with = "lenient")]
    pub sense_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pronunciation {
    #[serde(deserialize_with = "lenient")]
    pub audio_file: String,
    #[serde(deserialize_with = "lenient")]
    pub dialects: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub phonetic_notation: String,
    #[serde(deserialize_with = "lenient")]
    pub phonetic_spelling: String,
}

impl DictionaryResponse {
    /// Decodes a response body. Only bytes that are not a JSON object are an
    /// error; missing, `null` and wrongly typed fields default and unknown
    /// fields are ignored.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DictionaryError> {
        serde_json::from_slice(bytes).map_err(DictionaryError::MalformedResponse)
    }

    pub fn is_found(&self) -> bool {
        !self.id.is_empty()
    }

    /// All lexical entries of all results, in response order.
    pub fn lexical_entries(&self) -> impl Iterator<Item = &LexicalEntry> {
        self.results
            .iter()
            .flat_map(|result| result.lexical_entries.iter())
    }

    /// Non-empty pronunciation clip URLs, in response order.
    pub fn audio_files(&self) -> impl Iterator<Item = &str> {
        self.lexical_entries()
            .flat_map(|entry| entry.pronunciations.iter())
            .map(|pronunciation| &pronunciation.audio_file[..])
            .filter(|url| !url.is_empty())
    }
}

impl Sense {
    pub fn example_texts(&self) -> impl Iterator<Item = &str> {
        self.examples.iter().map(|example| &example.text[..])
    }
}

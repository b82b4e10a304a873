use crate::Passage;

/// Where a passage's display text may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// The passage's own chunk text.
    ChunkText,
    /// A named payload field in `structured_metadata`.
    Field(&'static str),
}

/// Tried in order; the first non-empty candidate wins.
pub const CONTENT_PRECEDENCE: [ContentSource; 7] = [
    ContentSource::ChunkText,
    ContentSource::Field("chunk_text"),
    ContentSource::Field("content"),
    ContentSource::Field("text"),
    ContentSource::Field("document"),
    ContentSource::Field("raw_text"),
    ContentSource::Field("text_body"),
];

/// Header lines appended under a passage label, each with the keys that may
/// carry it. Email ingestion stores `from_email`, `to_email`, `email_date`.
const METADATA_LINES: [(&str, &[&str]); 4] = [
    ("Subject", &["subject"]),
    ("From", &["from", "from_email"]),
    ("To", &["to", "to_email"]),
    ("Date", &["date", "email_date"]),
];

const ASSISTANT_ROLE: &str = "You are a helpful enterprise assistant answering questions about internal documents.";

impl ContentSource {
    fn extract<'a>(&self, passage: &'a Passage) -> Option<&'a str> {
        let candidate = match self {
            ContentSource::ChunkText => Some(passage.content.as_str()),
            ContentSource::Field(key) => passage.structured_metadata.get(*key).map(String::as_str),
        };
        candidate.map(str::trim).filter(|text| !text.is_empty())
    }
}

/// Display text for a passage, or `""` when every source is empty.
pub fn passage_content(passage: &Passage) -> &str {
    CONTENT_PRECEDENCE
        .iter()
        .find_map(|source| source.extract(passage))
        .unwrap_or_default()
}

pub fn system_prompt() -> &'static str {
    ASSISTANT_ROLE
}

pub fn compose(question: &str, passages: &[Passage]) -> String {
    let context = passages
        .iter()
        .enumerate()
        .map(|(position, passage)| passage_block(position + 1, passage))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{ASSISTANT_ROLE} \
         Use only the provided context to answer the user's question. \
         If no relevant violations are found, state explicitly that nothing was found \
         and that everything is in compliance based on the available data.\
         \n\nUse this information to answer the question:\n{context}\n\nQuestion: {question}"
    )
}

fn passage_block(rank: usize, passage: &Passage) -> String {
    let metadata = METADATA_LINES
        .iter()
        .filter_map(|(label, keys)| {
            keys.iter()
                .find_map(|key| passage.metadata(key))
                .map(|value| format!("{label}: {value}"))
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "[Source {rank}: {} (Score: {:.2})]\n{metadata}\n{}\n",
        passage.source_filename,
        passage.similarity,
        passage_content(passage)
    )
}

use std::fmt::Display;
use std::io::{self, Write};

use console::{style, StyledObject};
use dictionary::{DictionaryResponse, Entry, LexicalEntry, Pronunciation, Sense};
use pronounce::Pronouncer;

pub const NO_RESULT: &str = "No result";

const SHORT_DEFINITIONS: &str = "Short Definitions:";
const DEFINITIONS: &str = "Definitions:";
const EXAMPLES: &str = "Example sentence:";
const ETYMOLOGIES: &str = "Etymologies:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    Rendered { lexical_entries: usize },
}

/// Writes a decoded response as text, in response order.
pub struct Renderer<'a> {
    styled: bool,
    show_metadata: bool,
    pronouncer: Option<&'a dyn Pronouncer>,
}

impl<'a> Renderer<'a> {
    pub fn new() -> Self {
        Self {
            styled: false,
            show_metadata: false,
            pronouncer: None,
        }
    }

    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn show_metadata(mut self, show_metadata: bool) -> Self {
        self.show_metadata = show_metadata;
        self
    }

    /// Plays every pronunciation through `pronouncer` when `enabled`.
    pub fn with_voice(mut self, pronouncer: &'a dyn Pronouncer, enabled: bool) -> Self {
        self.pronouncer = enabled.then_some(pronouncer);
        self
    }

    pub async fn render<W: Write>(
        &self,
        response: &DictionaryResponse,
        out: &mut W,
    ) -> io::Result<Outcome> {
        if !response.is_found() {
            writeln!(out, "{}", self.paint(NO_RESULT).red())?;
            return Ok(Outcome::NotFound);
        }
        if self.show_metadata {
            self.write_metadata(response, out)?;
        }

        let mut lexical_entries = 0;
        for lexical_entry in response.lexical_entries() {
            self.write_header(response, lexical_entry, out)?;
            for pronunciation in &lexical_entry.pronunciations {
                self.write_pronunciation(pronunciation, out).await?;
            }
            for entry in &lexical_entry.entries {
                for sense in &entry.senses {
                    self.write_sense(entry, sense, out)?;
                }
            }
            writeln!(out)?;
            lexical_entries += 1;
        }
        Ok(Outcome::Rendered { lexical_entries })
    }

    fn paint<D: Display>(&self, value: D) -> StyledObject<D> {
        style(value).force_styling(self.styled)
    }

    fn label<'l>(&self, label: &'l str) -> StyledObject<&'l str> {
        self.paint(label).yellow().bold()
    }

    fn write_metadata<W: Write>(&self, response: &DictionaryResponse, out: &mut W) -> io::Result<()> {
        let metadata = &response.metadata;
        for (name, value) in [
            ("ID:", &response.id),
            ("Operation:", &metadata.operation),
            ("Provider:", &metadata.provider),
            ("Schema:", &metadata.schema),
        ] {
            writeln!(out, "{} {}", self.paint(name).dim(), value)?;
        }
        writeln!(out)
    }

    fn write_header<W: Write>(
        &self,
        response: &DictionaryResponse,
        lexical_entry: &LexicalEntry,
        out: &mut W,
    ) -> io::Result<()> {
        let word = if response.word.is_empty() {
            &lexical_entry.text
        } else {
            &response.word
        };
        let category = &lexical_entry.lexical_category.text;
        if category.is_empty() {
            writeln!(out, "{}", self.paint(word).green().bold())
        } else {
            writeln!(
                out,
                "{} ({})",
                self.paint(word).green().bold(),
                self.paint(category).magenta()
            )
        }
    }

    async fn write_pronunciation<W: Write>(
        &self,
        pronunciation: &Pronunciation,
        out: &mut W,
    ) -> io::Result<()> {
        if !pronunciation.phonetic_notation.is_empty() || !pronunciation.phonetic_spelling.is_empty() {
            writeln!(
                out,
                "  {}: {}",
                self.paint(&pronunciation.phonetic_notation).dim(),
                self.paint(&pronunciation.phonetic_spelling).cyan()
            )?;
        }
        if let Some(pronouncer) = self.pronouncer {
            let url = &pronunciation.audio_file;
            if !url.is_empty() {
                out.flush()?;
                if let Err(error) = pronouncer.play(url).await {
                    tracing::warn!(%url, %error, "pronunciation playback failed");
                    writeln!(
                        out,
                        "    {}",
                        self.paint(format!("(could not play pronunciation: {error})")).dim()
                    )?;
                }
            }
        }
        for dialect in &pronunciation.dialects {
            writeln!(out, "    {}", self.paint(dialect).dim())?;
        }
        Ok(())
    }

    fn write_sense<W: Write>(&self, entry: &Entry, sense: &Sense, out: &mut W) -> io::Result<()> {
        // label once per group, continuation lines aligned under the first
        for (index, short_definition) in sense.short_definitions.iter().enumerate() {
            if index == 0 {
                writeln!(out, "  {} {short_definition}", self.label(SHORT_DEFINITIONS))?;
            } else {
                writeln!(out, "  {:width$} {short_definition}", "", width = SHORT_DEFINITIONS.len())?;
            }
        }
        // label on every line
        for definition in &sense.definitions {
            writeln!(out, "  {} {definition}", self.label(DEFINITIONS))?;
        }
        self.write_section(EXAMPLES, sense.example_texts(), out)?;
        self.write_section(ETYMOLOGIES, entry.etymologies.iter().map(String::as_str), out)
    }

    /// `title` once, then one indented line per item. Nothing when empty.
    fn write_section<'s, W: Write>(
        &self,
        title: &str,
        items: impl Iterator<Item = &'s str>,
        out: &mut W,
    ) -> io::Result<()> {
        for (index, item) in items.enumerate() {
            if index == 0 {
                writeln!(out, "  {}", self.label(title))?;
            }
            writeln!(out, "    {}", self.paint(item).italic())?;
        }
        Ok(())
    }
}

impl Default for Renderer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

use std::fmt::Display;

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One available encoding of a video
#[derive(Debug, Clone, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    /// Total bitrate in kbps. Not every format reports it.
    #[serde(default)]
    pub tbr: Option<f64>,
}

impl Display for FormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tbr {
            Some(tbr) => write!(f, "{}: {} - {tbr} kbps", self.format_id, self.ext),
            None => write!(f, "{}: {} - n/a kbps", self.format_id, self.ext),
        }
    }
}

/// The metadata the downloader prints for a video.
///
/// Only the fields used here are typed, the whole object is kept in `raw`.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub id: String,
    pub title: Option<String>,
    pub formats: Vec<FormatDescriptor>,
    raw: Map<String, Value>,
}

#[derive(Deserialize)]
struct TypedFields {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    formats: Vec<FormatDescriptor>,
}

impl VideoInfo {
    /// Decode the downloader JSON output.
    ///
    /// The downloader prints one document per video. Only the first one is used.
    pub fn from_json(output: &str) -> Result<Self> {
        let mut documents = serde_json::Deserializer::from_str(output).into_iter::<Value>();
        let json = documents
            .next()
            .ok_or_else(|| miette!("Output is empty"))?
            .into_diagnostic()
            .wrap_err("Could not parse json")?;

        let Value::Object(raw) = json else {
            return Err(miette!("JSON is not an object"));
        };

        let fields: TypedFields = serde_json::from_value(Value::Object(raw.clone()))
            .into_diagnostic()
            .wrap_err("Unexpected JSON content")?;

        Ok(Self {
            id: fields.id,
            title: fields.title,
            formats: fields.formats,
            raw,
        })
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn has_formats(&self) -> bool {
        !self.formats.is_empty()
    }
}

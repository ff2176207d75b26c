use crate::error::{ExtractError, Result};
use log::debug;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Quad;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

fn load_error(path: &Path, reason: impl ToString) -> ExtractError {
    ExtractError::Load {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Reads an RDF file into quads, picking the syntax from the file extension
/// (Turtle when there is none). Relative IRIs resolve against the file's URL.
pub fn load_quads(path: impl AsRef<Path>) -> Result<Vec<Quad>> {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(RdfFormat::from_extension)
        .unwrap_or(RdfFormat::Turtle);

    let absolute = path.canonicalize().map_err(|e| load_error(path, e))?;
    let base = Url::from_file_path(&absolute)
        .map_err(|_| load_error(path, "cannot build a file URL"))?;
    let parser = RdfParser::from_format(format)
        .with_base_iri(base.as_str())
        .map_err(|e| load_error(path, e))?;

    let file = File::open(&absolute).map_err(|e| load_error(path, e))?;
    let quads = parser
        .for_reader(BufReader::new(file))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| load_error(path, e))?;
    debug!("loaded {} quad(s) from {}", quads.len(), path.display());
    Ok(quads)
}

//! # Dexsym
//!
//! A library for extracting API symbols from Android dex files
//!
//! A [`symbols::Dex`] holds the classes a dex file defines and every method
//! and field it declares or references, for comparing the API surface of two
//! builds. An optional [`mapping::ApiMapping`] undoes identifier obfuscation
//! after extraction.
//!
use crate::dex::error::DexError;
use crate::symbols::Dex;
use std::path::PathBuf;

pub mod dex;
pub mod mapping;
pub mod symbols;
#[cfg(test)]
mod tests;
pub mod types;

/// Recurses a base path, typically an unpacked apk, returning a symbol model for every found dex file
///
/// # Examples
///
/// ```no_run
///  use dexsym::find_dex_files;
///  use std::path::PathBuf;
///  use std::str::FromStr;
///
///  let p = PathBuf::from_str("apk").unwrap();
///  let models = find_dex_files(&p).unwrap();
///  println!("{:} dex files loaded.", models.len());
/// ```
pub fn find_dex_files(dir: &PathBuf) -> Result<Vec<Dex>, DexError> {
    let mut results = vec![];

    let entries = dir.read_dir().map_err(|e| DexError::new(&format!("io Error: {}", e)))?;
    for p in entries.flatten() {
        if let Ok(f) = p.file_type() {
            if f.is_dir() {
                let mut new_dir = dir.clone();
                new_dir.push(p.file_name());
                let dir_models = find_dex_files(&new_dir)?;
                results.extend(dir_models);
            } else if p.file_name().to_str().map(|n| n.ends_with(".dex")).unwrap_or(false) {
                let model = Dex::from_file(&p.path())?;
                results.push(model);
            }
        }
    }

    Ok(results)
}

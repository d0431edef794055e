//! Build script for the storefront crate.
//!
//! Copies `static/css/main.css` to `static/css/derived/main.{hash}.css` so the
//! stylesheet can be served with a long cache lifetime, and exposes the hash
//! as `CSS_HASH` for the `css_hash` template filter.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex characters of the SHA-256 kept in the file name.
const HASH_LEN: usize = 8;

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_dir = Path::new(&manifest_dir).join("static/css");

    let hash = hash_asset(&css_dir, "main", "css").unwrap_or_default();
    println!("cargo:rustc-env=CSS_HASH={hash}");
}

/// Copy `{dir}/{stem}.{ext}` into `{dir}/derived/` with its content hash in
/// the name, removing copies left over from earlier builds.
///
/// Returns `None` (with a build warning) if the source file is missing.
fn hash_asset(dir: &Path, stem: &str, ext: &str) -> Option<String> {
    let source = dir.join(format!("{stem}.{ext}"));
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(&source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", source.display());
            return None;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = digest.get(..HASH_LEN).unwrap_or(&digest).to_string();

    let derived_dir = dir.join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");

    let file_name = format!("{stem}.{hash}.{ext}");
    if let Ok(entries) = fs::read_dir(&derived_dir) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&format!("{stem}.")) && name.ends_with(ext) && name != file_name {
                let _ = fs::remove_file(entry.path());
            }
        }
    }

    fs::copy(&source, derived_dir.join(&file_name)).expect("Failed to copy hashed asset");
    Some(hash)
}

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const ASSET_DIR: &str = "static";

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return;
    };
    for entry in read_dir.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else if path.is_file() {
            out.push(path);
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed={ASSET_DIR}/");

    let mut files = Vec::new();
    collect_files(Path::new(ASSET_DIR), &mut files);
    files.sort();

    let mut hasher = DefaultHasher::new();
    for path in &files {
        let contents = fs::read(path).expect("static asset should be readable");
        path.to_string_lossy().hash(&mut hasher);
        contents.hash(&mut hasher);
    }

    let hash = format!("{:016x}", hasher.finish());
    println!("cargo:rustc-env=ASSET_HASH={}", &hash[..8]);
}

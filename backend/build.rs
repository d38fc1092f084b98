use std::fs;
use std::path::Path;

const PLACEHOLDER_INDEX: &str = "<!doctype html><title>Device editor</title>\
<p>The frontend bundle was not built. Run <code>trunk build</code> in <code>frontend/</code>.</p>";

fn main() {
    let out_dir = Path::new("static/dist");
    let dist_dir = Path::new("../frontend/dist");

    let _ = fs::remove_dir_all(out_dir);
    fs::create_dir_all(out_dir).expect("create static/dist");

    if dist_dir.exists() {
        fs_extra::dir::copy(
            dist_dir,
            out_dir,
            &fs_extra::dir::CopyOptions::new()
                .overwrite(true)
                .content_only(true),
        )
        .expect("copy frontend bundle");
    } else {
        // include_dir! needs the folder to exist.
        fs::write(out_dir.join("index.html"), PLACEHOLDER_INDEX).expect("write placeholder");
    }
    println!("cargo:rerun-if-changed=../frontend/dist");
}

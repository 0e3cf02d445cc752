use std::fs;
use std::path::Path;

use clap::CommandFactory;

// The CLI definition only needs clap + clap_complete, both of which are
// build-dependencies, so it can be compiled here on its own.
#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo");
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");

    write_manpages(cli::Cli::command(), &man_dir);
}

/// One page per command, named `condair-<sub>-<subsub>.1`.
fn write_manpages(cmd: clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut page)
        .unwrap_or_else(|e| panic!("rendering man page for `{name}`: {e}"));
    let path = dir.join(format!("{name}.1"));
    fs::write(&path, page).unwrap_or_else(|e| panic!("writing {}: {e}", path.display()));

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let qualified = format!("{name}-{}", sub.get_name());
        write_manpages(sub.clone().name(qualified), dir);
    }
}

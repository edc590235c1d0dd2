//! Prints an NBT file as an indented tree.
//!
//! Usage: `cargo run --example dump -- <file> [path]`, where the optional path picks a single tag
//! below the root, for example `Data.Player.Inventory[0]`.

use anyhow::{bail, Context, Result};
use ember_nbt::{io::Flavor, NbtFile};
use std::{env, path::PathBuf};

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let mut args = env::args_os().skip(1);
    let path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: dump <file> [path]"),
    };
    let lookup = args.next().map(|arg| arg.to_string_lossy().into_owned());

    let mut file = NbtFile::new();
    file.load_from_file(&path, Flavor::AutoDetect)
        .with_context(|| format!("failed to load `{}`", path.display()))?;

    match lookup {
        Some(lookup) => {
            let id = file
                .lookup(&lookup)
                .with_context(|| format!("no tag at `{}`", lookup))?;
            println!("{}", file.tree().display(id));
        }
        None => println!("{}", file),
    }

    Ok(())
}

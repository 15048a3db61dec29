use std::env;
use std::fs::File;
use std::process;

use minfs_core::check::check_image;
use minfs_core::errors::MinfsError;

fn main() {
    if let Err(e) = run() {
        eprintln!("fsck.minfs: error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), MinfsError> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Uso: fsck.minfs <device>");
        process::exit(1);
    }

    let path = &args[1];

    // solo lectura: fsck verifica, nunca repara
    let mut device = File::open(path)?;
    let disk_size = device.metadata()?.len();

    let report = check_image(&mut device, disk_size)?;
    println!(
        "fsck.minfs: '{}' limpio: {} bloques, {} libres, {} inodos declarados",
        path, report.layout.blocks_count, report.layout.free_blocks,
        report.superblock.inodes_count
    );
    Ok(())
}

use std::env;
use std::fs::OpenOptions;
use std::process;

use minfs_core::errors::MinfsError;
use minfs_core::fs_format::format_device;

fn main() {
    if let Err(e) = run() {
        eprintln!("mkfs.minfs: error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), MinfsError> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Uso: mkfs.minfs <device>");
        process::exit(1);
    }

    let path = &args[1];

    // el destino tiene que existir ya y con el tamaño final;
    // nunca se crea ni se redimensiona aqui
    let mut device = OpenOptions::new().read(true).write(true).open(path)?;
    let disk_size = device.metadata()?.len();
    println!("Disk size is {disk_size}");

    let ctx = format_device(&mut device, disk_size)?;
    println!("blocks count is {}", ctx.layout.blocks_count);
    println!("Super block written succesfully!");
    println!(
        "Create root dir successfully! ({} free data blocks)",
        ctx.layout.free_blocks
    );

    // device se cierra al salir de run, con o sin error
    Ok(())
}

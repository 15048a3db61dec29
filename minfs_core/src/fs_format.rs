use std::io::{Seek, SeekFrom, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::bitmap::Bitmap;
use crate::disk::{
    DirEntry, Inode, InodeKind, Superblock, BLOCK_SIZE, FILE_INODE, N_DIRECT, ROOT_INODE,
};
use crate::errors::{MinfsError, Result};
use crate::layout::Layout;

/// identidad y hora que quedan grabadas en los inodos iniciales
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    pub uid: u32,
    pub gid: u32,
    pub timestamp: i64,
}

impl FormatOptions {
    /// usuario que invoca y hora actual en segundos unix
    pub fn current() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };
        Self {
            uid,
            gid,
            timestamp,
        }
    }
}

/// estado completo de un formateo: geometria, superblock y ambos bitmaps
///
/// se construye una sola vez y se escribe una sola vez; nada de esto
/// se muta despues de write_to
#[derive(Debug, Clone)]
pub struct FormatContext {
    pub layout: Layout,
    pub superblock: Superblock,
    pub bmap: Bitmap,
    pub imap: Bitmap,
}

impl FormatContext {
    pub fn build(disk_size: u64) -> Result<Self> {
        let layout = Layout::for_disk_size(disk_size)?;
        let superblock = Superblock::from_layout(&layout);
        let bmap = Bitmap::block_usage(&layout)?;
        let imap = Bitmap::inode_usage(&layout)?;
        Ok(Self {
            layout,
            superblock,
            bmap,
            imap,
        })
    }

    /// inodo del directorio raiz: un bloque directo apuntando al primer
    /// bloque de datos, tres hijos (".", "..", "file")
    pub fn root_inode(&self, opts: &FormatOptions) -> Inode {
        let mut block = [0u64; N_DIRECT];
        block[0] = self.layout.data_block_number;
        Inode {
            inode_no: ROOT_INODE,
            kind: InodeKind::Directory { children_count: 3 },
            blocks: 1,
            block,
            uid: opts.uid,
            gid: opts.gid,
            nlink: 2,
            atime: opts.timestamp,
            mtime: opts.timestamp,
            ctime: opts.timestamp,
        }
    }

    /// inodo del archivo regular vacio: sin bloques, tamaño cero
    pub fn file_inode(&self, opts: &FormatOptions) -> Inode {
        Inode {
            inode_no: FILE_INODE,
            kind: InodeKind::File { size: 0 },
            blocks: 0,
            block: [0u64; N_DIRECT],
            uid: opts.uid,
            gid: opts.gid,
            nlink: 1,
            atime: opts.timestamp,
            mtime: opts.timestamp,
            ctime: opts.timestamp,
        }
    }

    /// las tres entradas del directorio raiz, en este orden
    pub fn root_entries() -> Result<[DirEntry; 3]> {
        Ok([
            DirEntry::new(".", ROOT_INODE)?,
            DirEntry::new("..", ROOT_INODE)?,
            DirEntry::new("file", FILE_INODE)?,
        ])
    }

    /// escribe la imagen en orden: bloque dummy, superblock, bitmap de
    /// bloques, bitmap de inodos, los dos inodos al inicio de la tabla,
    /// y tras reposicionar el cursor, las tres entradas de la raiz
    ///
    /// cada escritura se verifica contra el conteo esperado; cualquier
    /// diferencia aborta sin reintento ni rollback
    pub fn write_to<W: Write + Seek>(&self, device: &mut W, opts: &FormatOptions) -> Result<()> {
        let dummy = [0u8; BLOCK_SIZE];
        write_exact(device, &dummy)?;

        write_exact(device, &self.superblock.to_bytes())?;
        write_exact(device, self.bmap.as_bytes())?;
        write_exact(device, self.imap.as_bytes())?;

        write_exact(device, &self.root_inode(opts).to_bytes())?;
        write_exact(device, &self.file_inode(opts).to_bytes())?;

        device.seek(SeekFrom::Start(
            self.layout.data_block_number * BLOCK_SIZE as u64,
        ))?;
        for entry in Self::root_entries()? {
            write_exact(device, &entry.to_bytes())?;
        }
        Ok(())
    }
}

/// pipeline completo: calcular geometria y escribir la imagen
pub fn format_device<W: Write + Seek>(device: &mut W, disk_size: u64) -> Result<FormatContext> {
    let ctx = FormatContext::build(disk_size)?;
    let opts = FormatOptions::current();
    ctx.write_to(device, &opts)?;
    Ok(ctx)
}

fn write_exact<W: Write>(device: &mut W, buf: &[u8]) -> Result<()> {
    let written = device.write(buf)?;
    if written != buf.len() {
        return Err(MinfsError::ShortWrite {
            expected: buf.len(),
            written,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::{DIR_ENTRY_SIZE, INODE_SIZE, MINFS_MAGIC};
    use std::io::Cursor;

    const IMAGE_SIZE: u64 = 409_600; // 100 bloques

    fn fixed_opts() -> FormatOptions {
        FormatOptions {
            uid: 1000,
            gid: 1000,
            timestamp: 1_700_000_000,
        }
    }

    fn format_in_memory(opts: &FormatOptions) -> Vec<u8> {
        let mut cursor = Cursor::new(vec![0u8; IMAGE_SIZE as usize]);
        let ctx = FormatContext::build(IMAGE_SIZE).unwrap();
        ctx.write_to(&mut cursor, opts).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn image_regions_land_on_their_blocks() {
        let image = format_in_memory(&fixed_opts());

        // bloque 0: dummy en cero
        assert!(image[..BLOCK_SIZE].iter().all(|&b| b == 0));

        // bloque 1: superblock con magic en el offset 8
        let sb = Superblock::from_bytes(&image[BLOCK_SIZE..2 * BLOCK_SIZE]).unwrap();
        assert_eq!(sb.magic, MINFS_MAGIC);
        assert_eq!(sb.blocks_count, 100);
        assert_eq!(sb.free_blocks, 89);
        assert_eq!(sb.data_block_number, 10);

        // bloque 2: bitmap de bloques, 11 bits en uso
        let bmap = &image[2 * BLOCK_SIZE..3 * BLOCK_SIZE];
        assert_eq!(bmap[0], 0xff);
        assert_eq!(bmap[1], 0x07);
        assert!(bmap[2..].iter().all(|&b| b == 0));

        // bloque 3: bitmap de inodos, bits 0 y 1
        let imap = &image[3 * BLOCK_SIZE..4 * BLOCK_SIZE];
        assert_eq!(imap[0], 0x03);
        assert!(imap[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn inode_table_holds_root_and_file() {
        let opts = fixed_opts();
        let image = format_in_memory(&opts);
        let table = 4 * BLOCK_SIZE;

        let root = Inode::from_bytes(&image[table..table + INODE_SIZE]).unwrap();
        assert_eq!(root.inode_no, ROOT_INODE);
        assert_eq!(root.kind, InodeKind::Directory { children_count: 3 });
        assert_eq!(root.blocks, 1);
        assert_eq!(root.block[0], 10);
        assert_eq!(root.nlink, 2);
        assert_eq!(root.uid, opts.uid);
        assert_eq!((root.atime, root.mtime, root.ctime), (opts.timestamp, opts.timestamp, opts.timestamp));

        let file =
            Inode::from_bytes(&image[table + INODE_SIZE..table + 2 * INODE_SIZE]).unwrap();
        assert_eq!(file.inode_no, FILE_INODE);
        assert_eq!(file.kind, InodeKind::File { size: 0 });
        assert_eq!(file.blocks, 0);
        assert!(file.block.iter().all(|&b| b == 0));
        assert_eq!(file.nlink, 1);

        // el resto de la tabla queda en cero
        let rest = &image[table + 2 * INODE_SIZE..10 * BLOCK_SIZE];
        assert!(rest.iter().all(|&b| b == 0));
    }

    #[test]
    fn root_block_has_the_three_entries_in_order() {
        let image = format_in_memory(&fixed_opts());
        let base = 10 * BLOCK_SIZE;

        let expected: [(&[u8], u64); 3] =
            [(b".", ROOT_INODE), (b"..", ROOT_INODE), (b"file", FILE_INODE)];
        for (i, (name, ino)) in expected.iter().enumerate() {
            let off = base + i * DIR_ENTRY_SIZE;
            let entry = DirEntry::from_bytes(&image[off..off + DIR_ENTRY_SIZE]).unwrap();
            assert_eq!(entry.name_bytes(), *name);
            assert_eq!(entry.inode_no, *ino);
        }

        // despues de las tres entradas el bloque sigue en cero
        let tail = &image[base + 3 * DIR_ENTRY_SIZE..11 * BLOCK_SIZE];
        assert!(tail.iter().all(|&b| b == 0));
    }

    #[test]
    fn formatting_is_deterministic_for_fixed_options() {
        let opts = fixed_opts();
        assert_eq!(format_in_memory(&opts), format_in_memory(&opts));
    }

    #[test]
    fn two_runs_differ_only_in_timestamps() {
        let mut first = format_in_memory(&FormatOptions {
            timestamp: 1_700_000_000,
            ..fixed_opts()
        });
        let mut second = format_in_memory(&FormatOptions {
            timestamp: 1_700_000_777,
            ..fixed_opts()
        });
        assert_ne!(first, second);

        // en cero los tres timestamps de cada uno de los dos inodos
        let table = 4 * BLOCK_SIZE;
        for image in [&mut first, &mut second] {
            for inode in 0..2 {
                let times = table + inode * INODE_SIZE + 128;
                image[times..times + 24].fill(0);
            }
        }
        assert_eq!(first, second);
    }

    #[test]
    fn format_device_rejects_tiny_targets() {
        let size = 2 * BLOCK_SIZE as u64;
        let mut cursor = Cursor::new(vec![0u8; size as usize]);
        assert!(matches!(
            format_device(&mut cursor, size),
            Err(MinfsError::DeviceTooSmall { .. })
        ));
        // no se escribio nada antes de fallar
        assert!(cursor.into_inner().iter().all(|&b| b == 0));
    }
}

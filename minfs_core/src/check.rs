use std::io::{Read, Seek, SeekFrom};

use crate::bitmap::Bitmap;
use crate::disk::{
    DirEntry, Inode, InodeKind, Superblock, BLOCK_SIZE, DIR_ENTRY_SIZE, FILE_INODE, INODE_SIZE,
    ROOT_INODE,
};
use crate::errors::{MinfsError, Result};
use crate::layout::Layout;

/// resultado de verificar una imagen recien formateada
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub superblock: Superblock,
    pub layout: Layout,
    pub root_inode: Inode,
    pub file_inode: Inode,
}

fn read_block_at<R: Read + Seek>(device: &mut R, block: u64) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; BLOCK_SIZE];
    device.seek(SeekFrom::Start(block * BLOCK_SIZE as u64))?;
    device.read_exact(&mut buf)?;
    Ok(buf)
}

/// verifica una imagen: superblock contra la geometria recalculada,
/// bitmaps contra los patrones de formateo, los dos inodos iniciales
/// y las tres entradas de la raiz; solo lectura, nunca repara
pub fn check_image<R: Read + Seek>(device: &mut R, disk_size: u64) -> Result<CheckReport> {
    // 1. superblock del bloque 1 (from_bytes ya valida magic y version)
    let superblock = Superblock::from_bytes(&read_block_at(device, 1)?)?;

    // 2. la geometria declarada tiene que coincidir con la recalculada
    let layout = Layout::for_disk_size(disk_size)?;
    let expected = Superblock::from_layout(&layout);
    if superblock != expected {
        return Err(MinfsError::Corrupt(format!(
            "superblock does not match device geometry: {superblock:?} vs {expected:?}"
        )));
    }

    // 3. bitmaps identicos a los de una imagen recien formateada
    let expected_bmap = Bitmap::block_usage(&layout)?;
    let mut bmap = vec![0u8; layout.bmap_blocks as usize * BLOCK_SIZE];
    device.seek(SeekFrom::Start(layout.bmap_block() * BLOCK_SIZE as u64))?;
    device.read_exact(&mut bmap)?;
    if bmap != expected_bmap.as_bytes() {
        return Err(MinfsError::Corrupt("block bitmap mismatch".into()));
    }

    let expected_imap = Bitmap::inode_usage(&layout)?;
    let mut imap = vec![0u8; layout.imap_blocks as usize * BLOCK_SIZE];
    device.read_exact(&mut imap)?;
    if imap != expected_imap.as_bytes() {
        return Err(MinfsError::Corrupt("inode bitmap mismatch".into()));
    }

    // 4. los dos inodos al inicio de la tabla
    let mut table = vec![0u8; 2 * INODE_SIZE];
    device.seek(SeekFrom::Start(
        layout.inode_table_block() * BLOCK_SIZE as u64,
    ))?;
    device.read_exact(&mut table)?;

    let root_inode = Inode::from_bytes(&table[..INODE_SIZE])?;
    if root_inode.inode_no != ROOT_INODE
        || !matches!(root_inode.kind, InodeKind::Directory { children_count: 3 })
        || root_inode.block[0] != layout.data_block_number
    {
        return Err(MinfsError::Corrupt(format!(
            "bad root inode: {root_inode:?}"
        )));
    }

    let file_inode = Inode::from_bytes(&table[INODE_SIZE..])?;
    if file_inode.inode_no != FILE_INODE
        || !matches!(file_inode.kind, InodeKind::File { size: 0 })
        || file_inode.blocks != 0
    {
        return Err(MinfsError::Corrupt(format!(
            "bad file inode: {file_inode:?}"
        )));
    }

    // 5. las tres entradas del directorio raiz, en orden
    let root_block = read_block_at(device, layout.data_block_number)?;
    let expected_names: [(&[u8], u64); 3] =
        [(b".", ROOT_INODE), (b"..", ROOT_INODE), (b"file", FILE_INODE)];
    for (i, (name, ino)) in expected_names.iter().enumerate() {
        let off = i * DIR_ENTRY_SIZE;
        let entry = DirEntry::from_bytes(&root_block[off..off + DIR_ENTRY_SIZE])?;
        if entry.name_bytes() != *name || entry.inode_no != *ino {
            return Err(MinfsError::Corrupt(format!(
                "root entry {i}: expected {:?} -> {ino}, found {:?} -> {}",
                String::from_utf8_lossy(name),
                String::from_utf8_lossy(entry.name_bytes()),
                entry.inode_no
            )));
        }
    }

    Ok(CheckReport {
        superblock,
        layout,
        root_inode,
        file_inode,
    })
}

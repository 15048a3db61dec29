use crate::errors::{MinfsError, Result};
use crate::layout::Layout;

/// identificador de bloque
pub type BlockId = u64;

/// tamaño fijo del bloque logico
pub const BLOCK_SIZE: usize = 4096;

/// bits que caben en un bloque de bitmap
pub const BITS_PER_BLOCK: u64 = (BLOCK_SIZE * 8) as u64;

/// numero magico minfs
pub const MINFS_MAGIC: u64 = 0x4D49_4E46_5331; // "MINFS1"

/// version del formato minfs
pub const MINFS_VERSION: u64 = 1;

/// tamaño fijo del registro de inodo en disco
pub const INODE_SIZE: usize = 264;

/// inodos que caben en un bloque (division entera, sobra un residuo)
pub const INODES_PER_BLOCK: u64 = (BLOCK_SIZE / INODE_SIZE) as u64;

/// punteros directos por inodo
pub const N_DIRECT: usize = 10;

/// capacidad del buffer de nombre, terminado en NUL
pub const FILENAME_MAX_LEN: usize = 256;

/// tamaño fijo de una entrada de directorio
pub const DIR_ENTRY_SIZE: usize = FILENAME_MAX_LEN + 8;

/// bloques reservados antes de los bitmaps: dummy + superblock
pub const RESERVED_BLOCKS: u64 = 2;

/// inodo del directorio raiz
pub const ROOT_INODE: u64 = 0;

/// inodo del archivo regular inicial
pub const FILE_INODE: u64 = 1;

fn read_u64(buf: &[u8], off: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    u64::from_le_bytes(b)
}

fn read_u32(buf: &[u8], off: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[off..off + 4]);
    u32::from_le_bytes(b)
}

fn read_i64(buf: &[u8], off: usize) -> i64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[off..off + 8]);
    i64::from_le_bytes(b)
}

/// tipo de inodo, discriminado por el campo mode en disco
///
/// el valor de 64 bits en el offset 104 se interpreta segun el mode:
/// tamaño en bytes para archivos, cantidad de hijos para directorios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeKind {
    Directory { children_count: u64 },
    File { size: u64 },
}

impl InodeKind {
    pub fn mode(&self) -> u32 {
        match self {
            InodeKind::Directory { .. } => libc::S_IFDIR,
            InodeKind::File { .. } => libc::S_IFREG,
        }
    }

    /// el u64 que va al offset 104 del registro
    pub fn payload(&self) -> u64 {
        match self {
            InodeKind::Directory { children_count } => *children_count,
            InodeKind::File { size } => *size,
        }
    }

    pub fn from_mode(mode: u32, payload: u64) -> Result<Self> {
        match mode & libc::S_IFMT {
            libc::S_IFDIR => Ok(InodeKind::Directory {
                children_count: payload,
            }),
            libc::S_IFREG => Ok(InodeKind::File { size: payload }),
            other => Err(MinfsError::Corrupt(format!(
                "unsupported inode mode {other:#o}"
            ))),
        }
    }
}

/// registro de inodo en disco, 264 bytes
///
/// layout little-endian:
/// - 0   mode (u32), 4 bytes de relleno
/// - 8   inode_no (u64)
/// - 16  blocks (u64)
/// - 24  block[10] (u64 cada uno)
/// - 104 file_size o dir_children_count (u64, segun mode)
/// - 112 uid, 116 gid, 120 nlink (u32), 4 bytes de relleno
/// - 128 atime, 136 mtime, 144 ctime (i64)
/// - 152 relleno en cero hasta 264
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub inode_no: u64,
    pub kind: InodeKind,
    pub blocks: u64,
    pub block: [u64; N_DIRECT],
    pub uid: u32,
    pub gid: u32,
    pub nlink: u32,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

impl Inode {
    pub fn to_bytes(&self) -> [u8; INODE_SIZE] {
        let mut buf = [0u8; INODE_SIZE];
        buf[0..4].copy_from_slice(&self.kind.mode().to_le_bytes());
        buf[8..16].copy_from_slice(&self.inode_no.to_le_bytes());
        buf[16..24].copy_from_slice(&self.blocks.to_le_bytes());
        for (i, ptr) in self.block.iter().enumerate() {
            let off = 24 + i * 8;
            buf[off..off + 8].copy_from_slice(&ptr.to_le_bytes());
        }
        buf[104..112].copy_from_slice(&self.kind.payload().to_le_bytes());
        buf[112..116].copy_from_slice(&self.uid.to_le_bytes());
        buf[116..120].copy_from_slice(&self.gid.to_le_bytes());
        buf[120..124].copy_from_slice(&self.nlink.to_le_bytes());
        buf[128..136].copy_from_slice(&self.atime.to_le_bytes());
        buf[136..144].copy_from_slice(&self.mtime.to_le_bytes());
        buf[144..152].copy_from_slice(&self.ctime.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < INODE_SIZE {
            return Err(MinfsError::ShortRead {
                expected: INODE_SIZE,
                read: buf.len(),
            });
        }
        let kind = InodeKind::from_mode(read_u32(buf, 0), read_u64(buf, 104))?;
        let mut block = [0u64; N_DIRECT];
        for (i, ptr) in block.iter_mut().enumerate() {
            *ptr = read_u64(buf, 24 + i * 8);
        }
        Ok(Self {
            inode_no: read_u64(buf, 8),
            kind,
            blocks: read_u64(buf, 16),
            block,
            uid: read_u32(buf, 112),
            gid: read_u32(buf, 116),
            nlink: read_u32(buf, 120),
            atime: read_i64(buf, 128),
            mtime: read_i64(buf, 136),
            ctime: read_i64(buf, 144),
        })
    }
}

/// entrada de directorio, 264 bytes: nombre con NUL + numero de inodo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub filename: [u8; FILENAME_MAX_LEN],
    pub inode_no: u64,
}

impl DirEntry {
    pub fn new(name: &str, inode_no: u64) -> Result<Self> {
        let bytes = name.as_bytes();
        // tiene que caber el nombre mas su terminador NUL
        if bytes.is_empty() || bytes.len() >= FILENAME_MAX_LEN {
            return Err(MinfsError::NameTooLong {
                len: bytes.len(),
                max: FILENAME_MAX_LEN - 1,
            });
        }
        let mut filename = [0u8; FILENAME_MAX_LEN];
        filename[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { filename, inode_no })
    }

    /// nombre hasta el primer NUL
    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .filename
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(FILENAME_MAX_LEN);
        &self.filename[..end]
    }

    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut buf = [0u8; DIR_ENTRY_SIZE];
        buf[..FILENAME_MAX_LEN].copy_from_slice(&self.filename);
        buf[FILENAME_MAX_LEN..].copy_from_slice(&self.inode_no.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < DIR_ENTRY_SIZE {
            return Err(MinfsError::ShortRead {
                expected: DIR_ENTRY_SIZE,
                read: buf.len(),
            });
        }
        let mut filename = [0u8; FILENAME_MAX_LEN];
        filename.copy_from_slice(&buf[..FILENAME_MAX_LEN]);
        Ok(Self {
            filename,
            inode_no: read_u64(buf, FILENAME_MAX_LEN),
        })
    }
}

/// superblock minfs
///
/// bloque 1 contiene esta estructura: diez campos u64 little-endian
/// en los offsets 0, 8, ..., 72, y relleno en cero hasta BLOCK_SIZE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    pub version: u64,
    pub magic: u64,
    pub block_size: u64,
    pub inodes_count: u64,
    pub free_blocks: u64,
    pub blocks_count: u64,

    /// inicio del bitmap de bloques
    pub bmap_block: u64,
    /// inicio del bitmap de inodos
    pub imap_block: u64,
    /// inicio de la tabla de inodos
    pub inode_table_block: u64,
    /// primer bloque de datos (lo ocupa el directorio raiz)
    pub data_block_number: u64,
}

impl Superblock {
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            version: MINFS_VERSION,
            magic: MINFS_MAGIC,
            block_size: BLOCK_SIZE as u64,
            inodes_count: layout.inodes_count,
            free_blocks: layout.free_blocks,
            blocks_count: layout.blocks_count,
            bmap_block: layout.bmap_block(),
            imap_block: layout.imap_block(),
            inode_table_block: layout.inode_table_block(),
            data_block_number: layout.data_block_number,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MINFS_MAGIC
            && self.version == MINFS_VERSION
            && self.block_size == BLOCK_SIZE as u64
    }

    fn fields(&self) -> [u64; 10] {
        [
            self.version,
            self.magic,
            self.block_size,
            self.inodes_count,
            self.free_blocks,
            self.blocks_count,
            self.bmap_block,
            self.imap_block,
            self.inode_table_block,
            self.data_block_number,
        ]
    }

    /// serializa a un bloque completo
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; BLOCK_SIZE];
        for (i, field) in self.fields().iter().enumerate() {
            buf[i * 8..i * 8 + 8].copy_from_slice(&field.to_le_bytes());
        }
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < BLOCK_SIZE {
            return Err(MinfsError::ShortRead {
                expected: BLOCK_SIZE,
                read: buf.len(),
            });
        }
        let sb = Self {
            version: read_u64(buf, 0),
            magic: read_u64(buf, 8),
            block_size: read_u64(buf, 16),
            inodes_count: read_u64(buf, 24),
            free_blocks: read_u64(buf, 32),
            blocks_count: read_u64(buf, 40),
            bmap_block: read_u64(buf, 48),
            imap_block: read_u64(buf, 56),
            inode_table_block: read_u64(buf, 64),
            data_block_number: read_u64(buf, 72),
        };
        if !sb.is_valid() {
            return Err(MinfsError::InvalidSuperblock(format!(
                "magic {:#x}, version {}, block size {}",
                sb.magic, sb.version, sb.block_size
            )));
        }
        Ok(sb)
    }
}

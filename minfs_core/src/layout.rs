use crate::disk::{BlockId, BITS_PER_BLOCK, BLOCK_SIZE, INODES_PER_BLOCK, RESERVED_BLOCKS};
use crate::errors::{MinfsError, Result};

/// geometria calculada a partir del tamaño del dispositivo
///
/// orden en disco: bloque dummy, superblock, bitmap de bloques,
/// bitmap de inodos, tabla de inodos, y de ahi en adelante datos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub disk_size: u64,
    pub blocks_count: u64,
    pub inodes_count: u64,
    pub bmap_blocks: u64,
    pub imap_blocks: u64,
    pub inode_table_blocks: u64,
    /// primer bloque de datos; el directorio raiz lo ocupa
    pub data_block_number: u64,
    pub free_blocks: u64,
}

impl Layout {
    pub fn for_disk_size(disk_size: u64) -> Result<Self> {
        // el residuo que no completa un bloque se descarta
        let blocks_count = disk_size / BLOCK_SIZE as u64;
        let inodes_count = blocks_count;

        // los bitmaps redondean hacia arriba para no perder bits
        let mut bmap_blocks = blocks_count / BITS_PER_BLOCK;
        if blocks_count % BITS_PER_BLOCK != 0 {
            bmap_blocks += 1;
        }
        let mut imap_blocks = inodes_count / BITS_PER_BLOCK;
        if inodes_count % BITS_PER_BLOCK != 0 {
            imap_blocks += 1;
        }

        // la tabla de inodos NO redondea: si inodes_count no es multiplo
        // de INODES_PER_BLOCK la tabla queda corta respecto al contador
        // declarado; ver inode_table_capacity()
        let inode_table_blocks = inodes_count / INODES_PER_BLOCK;

        let data_block_number =
            RESERVED_BLOCKS + bmap_blocks + imap_blocks + inode_table_blocks;

        // el -1 aparta el bloque de datos del directorio raiz
        if blocks_count < data_block_number + 1 {
            return Err(MinfsError::DeviceTooSmall {
                blocks: blocks_count,
                required: data_block_number + 1,
            });
        }
        let free_blocks = blocks_count - data_block_number - 1;

        Ok(Self {
            disk_size,
            blocks_count,
            inodes_count,
            bmap_blocks,
            imap_blocks,
            inode_table_blocks,
            data_block_number,
            free_blocks,
        })
    }

    /// primer bloque del bitmap de bloques
    pub fn bmap_block(&self) -> BlockId {
        RESERVED_BLOCKS
    }

    /// primer bloque del bitmap de inodos
    pub fn imap_block(&self) -> BlockId {
        self.bmap_block() + self.bmap_blocks
    }

    /// primer bloque de la tabla de inodos
    pub fn inode_table_block(&self) -> BlockId {
        self.imap_block() + self.imap_blocks
    }

    /// registros que caben de verdad en la tabla; puede ser menor que
    /// inodes_count por la division entera de arriba
    pub fn inode_table_capacity(&self) -> u64 {
        self.inode_table_blocks * INODES_PER_BLOCK
    }
}

use crate::disk::{BLOCK_SIZE, FILE_INODE, ROOT_INODE};
use crate::errors::{MinfsError, Result};
use crate::layout::Layout;

/// bitmap en memoria, dimensionado en bloques enteros
///
/// bit i en 1 significa bloque/inodo i en uso; el byte tocado es
/// index/8 y el bit dentro del byte es index%8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    bytes: Vec<u8>,
}

impl Bitmap {
    pub fn new(capacity_blocks: u64) -> Self {
        Self {
            bytes: vec![0u8; capacity_blocks as usize * BLOCK_SIZE],
        }
    }

    /// capacidad en bits, no en bytes
    pub fn capacity_bits(&self) -> u64 {
        self.bytes.len() as u64 * 8
    }

    pub fn set_bit(&mut self, index: u64, value: bool) -> Result<()> {
        // la cota se compara contra bits, no contra bytes
        if index >= self.capacity_bits() {
            return Err(MinfsError::BitmapOutOfBounds {
                index,
                capacity: self.capacity_bits(),
            });
        }
        let byte = (index / 8) as usize;
        let off = (index % 8) as u8;
        if value {
            self.bytes[byte] |= 1 << off;
        } else {
            self.bytes[byte] &= !(1 << off);
        }
        Ok(())
    }

    pub fn get_bit(&self, index: u64) -> Result<bool> {
        if index >= self.capacity_bits() {
            return Err(MinfsError::BitmapOutOfBounds {
                index,
                capacity: self.capacity_bits(),
            });
        }
        let byte = (index / 8) as usize;
        let off = (index % 8) as u8;
        Ok(self.bytes[byte] & (1 << off) != 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// bitmap de bloques recien formateado: en uso el area reservada
    /// completa mas el bloque de datos del directorio raiz
    pub fn block_usage(layout: &Layout) -> Result<Self> {
        let mut bmap = Self::new(layout.bmap_blocks);
        for idx in 0..=layout.data_block_number {
            bmap.set_bit(idx, true)?;
        }
        Ok(bmap)
    }

    /// bitmap de inodos recien formateado: raiz y archivo inicial
    pub fn inode_usage(layout: &Layout) -> Result<Self> {
        let mut imap = Self::new(layout.imap_blocks);
        imap.set_bit(ROOT_INODE, true)?;
        imap.set_bit(FILE_INODE, true)?;
        Ok(imap)
    }
}

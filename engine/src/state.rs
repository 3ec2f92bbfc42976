//! The NVRAM persistence boundary.
//!
//! The round driver persists its snapshot through this trait after every
//! mutation that must survive a power cycle. Storage is an external
//! collaborator: a durable key-value store accessed by name, holding opaque
//! byte blobs.

use anyhow::Result;

#[cfg(any(test, feature = "mocks"))]
use std::collections::HashMap;

pub trait Nvram {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;
    fn delete(&mut self, key: &str) -> Result<()>;
}

impl<N: Nvram + ?Sized> Nvram for &mut N {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).write(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

#[cfg(any(test, feature = "mocks"))]
#[derive(Default)]
pub struct Memory {
    blobs: HashMap<String, Vec<u8>>,
}

#[cfg(any(test, feature = "mocks"))]
impl Nvram for Memory {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.blobs.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DbError, Result};
use crate::{EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        let row = Self {
            id,
            username: username.into(),
            email: email.into(),
        };
        row.validate()?;
        Ok(row)
    }

    pub fn validate(&self) -> Result<()> {
        check_width("username", &self.username, USERNAME_SIZE)?;
        check_width("email", &self.email, EMAIL_SIZE)
    }

    /// Writes the row into `dst[..ROW_SIZE]`.
    ///
    /// Field widths are checked before any byte is written, and the unused
    /// tail of each string field is zeroed so a reused buffer never leaks
    /// bytes from a previous row.
    pub fn serialize(&self, dst: &mut [u8]) -> Result<()> {
        if dst.len() < ROW_SIZE {
            return Err(DbError::BufferTooSmall {
                len: dst.len(),
                need: ROW_SIZE,
            });
        }
        self.validate()?;

        LittleEndian::write_u32(&mut dst[ID_OFFSET..ID_OFFSET + ID_SIZE], self.id);
        write_field(&mut dst[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE], &self.username);
        write_field(&mut dst[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE], &self.email);
        Ok(())
    }

    pub fn deserialize(src: &[u8]) -> Result<Self> {
        if src.len() < ROW_SIZE {
            return Err(DbError::BufferTooSmall {
                len: src.len(),
                need: ROW_SIZE,
            });
        }

        Ok(Self {
            id: LittleEndian::read_u32(&src[ID_OFFSET..ID_OFFSET + ID_SIZE]),
            username: read_field(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]),
            email: read_field(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]),
        })
    }

    pub fn to_bytes(&self) -> Result<[u8; ROW_SIZE]> {
        let mut buf = [0u8; ROW_SIZE];
        self.serialize(&mut buf)?;
        Ok(buf)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Index: {}, Username: {}, Email: {}",
            self.id, self.username, self.email
        )
    }
}

fn check_width(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(DbError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

fn write_field(dst: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    dst[..bytes.len()].copy_from_slice(bytes);
    dst[bytes.len()..].fill(0);
}

fn read_field(src: &[u8]) -> String {
    let end = src.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&src[..end]).into_owned()
}

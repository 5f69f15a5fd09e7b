use crate::spec;

/// Archive magic, the fourCC `'XMVP'` in little-endian byte order.
pub const MAGIC: [u8; 4] = *b"PVMX";

/// The single supported archive version.
pub const VERSION: u8 = 1;

/// Validated archive header.
#[derive(Debug, Clone)]
pub struct PvmxHeader {
    magic: [u8; 4],
    version: u8,
}

impl PvmxHeader {
    #[inline]
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    #[inline]
    pub fn version(&self) -> u8 {
        self.version
    }
}

impl Default for PvmxHeader {
    fn default() -> Self {
        PvmxHeader {
            magic: MAGIC,
            version: VERSION,
        }
    }
}

impl TryFrom<spec::Header> for PvmxHeader {
    type Error = crate::error::PvmxError;

    fn try_from(this: spec::Header) -> Result<Self, Self::Error> {
        if this.magic != MAGIC {
            return Err(Self::Error::InvalidMagic {
                expected: MAGIC,
                found: this.magic,
            });
        }
        if this.version != VERSION {
            return Err(Self::Error::UnsupportedVersion(this.version));
        }

        Ok(PvmxHeader {
            magic: this.magic,
            version: this.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PvmxError;

    #[test]
    fn accepts_current_format() {
        let header = PvmxHeader::try_from(spec::Header {
            magic: MAGIC,
            version: VERSION,
        })
        .unwrap();
        assert_eq!(header.magic(), MAGIC);
        assert_eq!(header.version(), VERSION);
    }

    #[test]
    fn rejects_foreign_magic() {
        let result = PvmxHeader::try_from(spec::Header {
            magic: *b"KPKA",
            version: VERSION,
        });
        assert!(matches!(result, Err(PvmxError::InvalidMagic { .. })));
    }

    #[test]
    fn rejects_unknown_version() {
        let result = PvmxHeader::try_from(spec::Header {
            magic: MAGIC,
            version: 2,
        });
        assert!(matches!(result, Err(PvmxError::UnsupportedVersion(2))));
    }
}

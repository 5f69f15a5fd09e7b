use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LE, ReadBytesExt};

use crate::error::Result;
use crate::pak::{DictionaryEntry, DictionaryField, PvmxArchive, PvmxHeader, TexPackEntry};
use crate::spec;

/// Read and validate a whole archive dictionary.
///
/// The reader is left positioned at the first byte of the data section.
pub fn read_archive<R>(reader: &mut R) -> Result<PvmxArchive>
where
    R: Read,
{
    let spec_header = spec::Header::from_reader(reader)?;
    let header = PvmxHeader::try_from(spec_header)?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dictionary_entry(reader)? {
        entries.push(entry);
    }

    Ok(PvmxArchive::new(header, entries))
}

/// Decode one dictionary entry, or `None` at the end-of-dictionary
/// sentinel.
///
/// Tags are consumed until a `None` tag closes the field list; each known
/// tag determines how many payload bytes follow it. Unknown tag bytes are
/// skipped without consuming a payload so that field kinds introduced by
/// newer writers pass through. A `None` tag in first position is the
/// dictionary terminator. Each field list is followed by the entry's
/// 8-byte offset and 8-byte size.
fn read_dictionary_entry<R>(reader: &mut R) -> Result<Option<DictionaryEntry>>
where
    R: Read,
{
    let mut texture = TexPackEntry::default();
    let mut first = true;

    loop {
        let tag = reader.read_u8()?;
        match DictionaryField::from_tag(tag) {
            Some(DictionaryField::None) if first => return Ok(None),
            Some(DictionaryField::None) => break,
            Some(DictionaryField::GlobalIndex) => {
                texture.global_index = Some(reader.read_u32::<LE>()?);
            }
            Some(DictionaryField::Name) => {
                texture.name = read_cstr(reader)?;
            }
            Some(DictionaryField::Dimensions) => {
                texture.width = reader.read_u32::<LE>()?;
                texture.height = reader.read_u32::<LE>()?;
            }
            None => {}
        }
        first = false;
    }

    let offset = reader.read_u64::<LE>()?;
    let size = reader.read_u64::<LE>()?;

    Ok(Some(DictionaryEntry { texture, offset, size }))
}

/// Copy one entry's payload bytes out of the archive.
pub fn copy_entry_data<R, W>(reader: &mut R, entry: &DictionaryEntry, writer: &mut W) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    reader.seek(SeekFrom::Start(entry.offset))?;
    let mut payload = reader.by_ref().take(entry.size);
    Ok(std::io::copy(&mut payload, writer)?)
}

fn read_cstr<R>(reader: &mut R) -> Result<String>
where
    R: Read,
{
    let mut bytes = Vec::new();
    loop {
        let c = reader.read_u8()?;
        if c == 0 {
            break;
        }
        bytes.push(c);
    }

    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::PvmxError;

    fn dictionary_entry(global_index: Option<u32>, name: &str, dimensions: Option<(u32, u32)>) -> Vec<u8> {
        let mut bytes = Vec::new();
        if let Some(global_index) = global_index {
            bytes.push(1);
            bytes.extend_from_slice(&global_index.to_le_bytes());
        }
        bytes.push(2);
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(0);
        if let Some((width, height)) = dimensions {
            bytes.push(3);
            bytes.extend_from_slice(&width.to_le_bytes());
            bytes.extend_from_slice(&height.to_le_bytes());
        }
        bytes.push(0);
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes
    }

    fn archive_bytes(entries: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = b"PVMX\x01".to_vec();
        for entry in entries {
            bytes.extend_from_slice(entry);
        }
        bytes.push(0);
        bytes
    }

    #[test]
    fn decodes_tagged_fields() {
        let bytes = archive_bytes(&[dictionary_entry(Some(7), "foo.png", Some((64, 32)))]);
        let archive = read_archive(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(archive.header().version(), 1);
        assert_eq!(archive.entries().len(), 1);
        let entry = &archive.entries()[0];
        assert_eq!(entry.texture.global_index, Some(7));
        assert_eq!(entry.texture.name, "foo.png");
        assert_eq!(entry.texture.width, 64);
        assert_eq!(entry.texture.height, 32);
    }

    #[test]
    fn stops_at_dictionary_sentinel() {
        let mut bytes = archive_bytes(&[
            dictionary_entry(Some(1), "a.png", None),
            dictionary_entry(Some(2), "b.png", None),
        ]);
        // data section bytes after the sentinel must not be decoded
        bytes.extend_from_slice(b"\x01\x02\x03payload");

        let mut cursor = Cursor::new(bytes);
        let archive = read_archive(&mut cursor).unwrap();

        assert_eq!(archive.entries().len(), 2);
        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"\x01\x02\x03payload");
    }

    #[test]
    fn empty_dictionary_decodes_to_no_entries() {
        let bytes = archive_bytes(&[]);
        let archive = read_archive(&mut Cursor::new(bytes)).unwrap();
        assert!(archive.entries().is_empty());
    }

    #[test]
    fn unknown_tags_are_skipped_without_payload() {
        let mut entry = Vec::new();
        entry.push(0x7F); // unrecognized, carries no payload
        entry.extend_from_slice(&dictionary_entry(Some(9), "c.png", None));
        let bytes = archive_bytes(&[entry]);

        let archive = read_archive(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(archive.entries().len(), 1);
        assert_eq!(archive.entries()[0].texture.global_index, Some(9));
        assert_eq!(archive.entries()[0].texture.name, "c.png");
    }

    #[test]
    fn absent_global_index_is_distinct_from_zero() {
        let with_zero = dictionary_entry(Some(0), "zero.png", None);
        let without = dictionary_entry(None, "none.png", None);
        let bytes = archive_bytes(&[with_zero, without]);

        let archive = read_archive(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(archive.entries()[0].texture.global_index, Some(0));
        assert_eq!(archive.entries()[1].texture.global_index, None);
    }

    #[test]
    fn rejects_foreign_magic() {
        let mut bytes = archive_bytes(&[]);
        bytes[0] = b'Q';
        let err = read_archive(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PvmxError::InvalidMagic { .. }));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = archive_bytes(&[]);
        bytes[4] = 9;
        let err = read_archive(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PvmxError::UnsupportedVersion(9)));
    }

    #[test]
    fn copies_payload_ranges() {
        let mut bytes = archive_bytes(&[]);
        let data_start = bytes.len() as u64;
        bytes.extend_from_slice(b"aaabbbbb");

        let entry = DictionaryEntry {
            texture: TexPackEntry::default(),
            offset: data_start + 3,
            size: 5,
        };
        let mut out = Vec::new();
        let copied = copy_entry_data(&mut Cursor::new(bytes), &entry, &mut out).unwrap();
        assert_eq!(copied, 5);
        assert_eq!(out, b"bbbbb");
    }
}

use crc32fast::Hasher;

/// Generate a document ID from a file path using CRC32.
pub fn get_document_id(path: &str) -> String {
    let mut buff = String::from(path);
    if !path.starts_with("file://") {
        buff = format!("file://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_stable_per_path() {
        let id1 = get_document_id("/protocols/wash.pfm");
        let id2 = get_document_id("/protocols/wash.pfm");
        assert_eq!(id1, id2);

        let id3 = get_document_id("/protocols/stain.pfm");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_scheme_prefix_is_normalized() {
        assert_eq!(
            get_document_id("/entry.pfm"),
            get_document_id("file:///entry.pfm")
        );
    }
}

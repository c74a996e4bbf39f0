//! # Document Digest: Hash Binding
//!
//! Defines `DocumentDigest`, the tagged SHA-256 digest that a payload's
//! `doc_hash` field records, and the streaming functions that produce it.
//!
//! ## Security Invariant
//!
//! The digest covers the exact byte stream of the document. Hashing reads in
//! [`DIGEST_CHUNK_SIZE`] chunks, so peak memory stays bounded regardless of
//! document size. The rendered form is `SHA256:<lowercase hex>` and is
//! compared by exact string equality during verification.

use std::io::{self, Read};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Chunk size used when streaming a document through the hasher.
pub const DIGEST_CHUNK_SIZE: usize = 64 * 1024;

/// The hash algorithm used to produce a document digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256, the only algorithm payload version 1 defines.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the tag written in front of the hex digest.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document digest with its algorithm tag.
///
/// The 32-byte digest and the algorithm tag together form the self-describing
/// `doc_hash` value, e.g. `SHA256:2cf24dba...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl DocumentDigest {
    /// Create a new document digest from raw bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string (no tag).
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Render the tagged form stored in a payload's `doc_hash`.
    pub fn to_tagged(&self) -> String {
        format!("{}:{}", self.algorithm, self.to_hex())
    }
}

impl std::fmt::Display for DocumentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_tagged())
    }
}

/// Digest of a streamed document together with the number of bytes read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedDocument {
    /// SHA-256 digest of every byte read.
    pub digest: DocumentDigest,
    /// Total number of bytes hashed.
    pub len: u64,
}

/// Compute the SHA-256 digest of an in-memory document.
///
/// The slice is fed to the hasher in [`DIGEST_CHUNK_SIZE`] pieces, the same
/// way [`sha256_reader`] consumes a stream, so both paths are interchangeable.
pub fn sha256_bytes(document: &[u8]) -> HashedDocument {
    let mut hasher = Sha256::new();
    for chunk in document.chunks(DIGEST_CHUNK_SIZE) {
        hasher.update(chunk);
    }
    finish(hasher, document.len() as u64)
}

/// Compute the SHA-256 digest of a document read from `reader`.
///
/// Reads until EOF in [`DIGEST_CHUNK_SIZE`] chunks. Interrupted reads are
/// retried; any other I/O error is returned.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<HashedDocument> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; DIGEST_CHUNK_SIZE];
    let mut len = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        len += n as u64;
    }
    Ok(finish(hasher, len))
}

fn finish(hasher: Sha256, len: u64) -> HashedDocument {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    HashedDocument {
        digest: DocumentDigest::new(DigestAlgorithm::Sha256, bytes),
        len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello")
    const HELLO_HEX: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_known_vector() {
        let hashed = sha256_bytes(b"hello");
        assert_eq!(hashed.digest.to_hex(), HELLO_HEX);
        assert_eq!(hashed.len, 5);
    }

    #[test]
    fn test_tagged_form() {
        let digest = sha256_bytes(b"hello").digest;
        assert_eq!(digest.to_tagged(), format!("SHA256:{HELLO_HEX}"));
        assert_eq!(format!("{digest}"), digest.to_tagged());
    }

    #[test]
    fn test_empty_input() {
        let hashed = sha256_bytes(b"");
        assert_eq!(
            hashed.digest.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hashed.len, 0);
    }

    #[test]
    fn test_reader_matches_slice_across_chunk_boundaries() {
        let doc: Vec<u8> = (0..(DIGEST_CHUNK_SIZE * 3 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        let from_slice = sha256_bytes(&doc);
        let from_reader = sha256_reader(doc.as_slice()).unwrap();
        assert_eq!(from_slice, from_reader);
        assert_eq!(from_reader.len, doc.len() as u64);
    }

    #[test]
    fn test_single_bit_flip_changes_digest() {
        let mut doc = b"hello".to_vec();
        let original = sha256_bytes(&doc).digest;
        doc[0] ^= 0x01;
        assert_ne!(original, sha256_bytes(&doc).digest);
    }

    #[test]
    fn test_reader_error_propagates() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
            }
        }
        let err = sha256_reader(Broken).unwrap_err();
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(DigestAlgorithm::Sha256.to_string(), "SHA256");
    }
}

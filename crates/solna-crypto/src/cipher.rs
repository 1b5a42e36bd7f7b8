#![forbid(unsafe_code)]

//! AES-CBC block ciphers for encrypted assertions.
//!
//! Ciphertext layout is the XML Encryption one: a 16-byte IV followed by
//! the CBC blocks.

use solna_core::{algorithm, Error};

const BLOCK: usize = 16;

/// Trait for cipher algorithms.
pub trait CipherAlgorithm: Send {
    fn uri(&self) -> &'static str;
    fn key_size(&self) -> usize;
    /// Pad, encrypt under a fresh random IV, and prepend the IV.
    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error>;
    /// Decrypt without removing padding.
    ///
    /// The trailing pad bytes stay in the output; SAML consumers cut the
    /// assertion out of the plaintext instead of trusting the pad length.
    fn decrypt(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Create a cipher algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn CipherAlgorithm>, Error> {
    match uri {
        algorithm::AES128_CBC => Ok(Box::new(AesCbc {
            key_size: 16,
            uri: algorithm::AES128_CBC,
        })),
        algorithm::AES256_CBC => Ok(Box::new(AesCbc {
            key_size: 32,
            uri: algorithm::AES256_CBC,
        })),
        _ => Err(Error::UnsupportedAlgorithm(format!("cipher: {uri}"))),
    }
}

struct AesCbc {
    key_size: usize,
    uri: &'static str,
}

impl AesCbc {
    fn check_key(&self, key: &[u8]) -> Result<(), Error> {
        if key.len() != self.key_size {
            return Err(Error::Crypto(format!(
                "expected {} byte key, got {}",
                self.key_size,
                key.len()
            )));
        }
        Ok(())
    }
}

impl CipherAlgorithm for AesCbc {
    fn uri(&self) -> &'static str {
        self.uri
    }
    fn key_size(&self) -> usize {
        self.key_size
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        use cbc::cipher::{BlockEncryptMut, KeyIvInit};
        use rand::RngCore;

        self.check_key(key)?;

        let mut iv = [0u8; BLOCK];
        rand::thread_rng().fill_bytes(&mut iv);

        let mut buf = xmlenc_pad(plaintext);
        let buf_len = buf.len();

        macro_rules! do_encrypt {
            ($aes:ty) => {{
                let enc = cbc::Encryptor::<$aes>::new_from_slices(key, &iv)
                    .map_err(|e| Error::Crypto(format!("AES-CBC init: {e}")))?;
                enc.encrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf, buf_len)
                    .map_err(|e| Error::Crypto(format!("AES-CBC encrypt: {e}")))?;
            }};
        }

        match self.key_size {
            16 => do_encrypt!(aes::Aes128),
            32 => do_encrypt!(aes::Aes256),
            _ => return Err(Error::Crypto("unsupported AES key size".into())),
        }

        let mut result = Vec::with_capacity(BLOCK + buf.len());
        result.extend_from_slice(&iv);
        result.extend_from_slice(&buf);
        Ok(result)
    }

    fn decrypt(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
        use cbc::cipher::{BlockDecryptMut, KeyIvInit};

        self.check_key(key)?;
        if data.len() < BLOCK || data.len() % BLOCK != 0 {
            return Err(Error::Crypto("AES-CBC data invalid length".into()));
        }

        let (iv, ciphertext) = data.split_at(BLOCK);
        let mut buf = ciphertext.to_vec();

        macro_rules! do_decrypt {
            ($aes:ty) => {{
                let dec = cbc::Decryptor::<$aes>::new_from_slices(key, iv)
                    .map_err(|e| Error::Crypto(format!("AES-CBC init: {e}")))?;
                dec.decrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf)
                    .map_err(|e| Error::Crypto(format!("AES-CBC decrypt: {e}")))?;
            }};
        }

        match self.key_size {
            16 => do_decrypt!(aes::Aes128),
            32 => do_decrypt!(aes::Aes256),
            _ => return Err(Error::Crypto("unsupported AES key size".into())),
        }

        Ok(buf)
    }
}

/// XML Encryption block padding: always at least one byte, the last byte
/// holding the pad length.
fn xmlenc_pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK - (data.len() % BLOCK);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(pad_len as u8).take(pad_len));
    padded
}

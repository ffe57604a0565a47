//! AES-256-CFB stream wrapper for physical connections.
//!
//! The key is SHA-256 of the shared secret. Each direction has its own
//! keystream seeded by one half of the connection IV; the server decrypts
//! with the first half and encrypts with the second, the client mirrors it.
//! CFB here is the full-block variant (128-bit feedback), byte-granular.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use aes::Aes256;
use bytes::{Buf, BytesMut};
use cfb_mode::cipher::KeyIvInit;
use cfb_mode::{BufDecryptor, BufEncryptor};
use kcptun_core::defaults::{CIPHER_BLOCK_LEN, KEY_LEN};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::handshake::Iv;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("invalid key or iv length")]
    InvalidLength,
}

/// 32-byte AES-256 key.
#[derive(Clone)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    /// Derive the key from the shared secret.
    pub fn derive(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&digest);
        Self(key)
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(..)")
    }
}

/// Which end of the connection this wrapper sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherRole {
    Server,
    Client,
}

/// Encrypted duplex stream over `inner`.
///
/// Writes are encrypted once into an internal buffer and then drained to
/// `inner`, so a `Pending` from the inner writer never re-encrypts bytes.
/// Reads decrypt exactly the bytes the inner reader produced.
pub struct SecureStream<S> {
    inner: S,
    encryptor: BufEncryptor<Aes256>,
    decryptor: BufDecryptor<Aes256>,
    pending: BytesMut,
}

impl<S> SecureStream<S> {
    pub fn new(inner: S, key: &CipherKey, iv: &Iv, role: CipherRole) -> Result<Self, CipherError> {
        let bytes = iv.as_bytes();
        let (first, second) = bytes.split_at(CIPHER_BLOCK_LEN);
        let (decrypt_iv, encrypt_iv) = match role {
            CipherRole::Server => (first, second),
            CipherRole::Client => (second, first),
        };
        let encryptor = BufEncryptor::<Aes256>::new_from_slices(key.as_bytes(), encrypt_iv)
            .map_err(|_| CipherError::InvalidLength)?;
        let decryptor = BufDecryptor::<Aes256>::new_from_slices(key.as_bytes(), decrypt_iv)
            .map_err(|_| CipherError::InvalidLength)?;
        Ok(Self {
            inner,
            encryptor,
            decryptor,
            pending: BytesMut::new(),
        })
    }
}

impl<S: AsyncWrite + Unpin> SecureStream<S> {
    /// Write buffered ciphertext to the inner stream.
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while !self.pending.is_empty() {
            let n = ready!(Pin::new(&mut self.inner).poll_write(cx, &self.pending))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.pending.advance(n);
        }
        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for SecureStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        this.decryptor.decrypt(&mut buf.filled_mut()[before..]);
        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for SecureStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        let start = this.pending.len();
        this.pending.extend_from_slice(buf);
        this.encryptor.encrypt(&mut this.pending[start..]);

        // The plaintext is accepted now; leftovers go out on the next write or flush.
        if let Poll::Ready(Err(e)) = this.poll_drain(cx) {
            return Poll::Ready(Err(e));
        }
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}

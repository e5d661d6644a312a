use std::borrow::Cow;
use std::fmt;
use std::io::{self, Cursor, Read};

use bytes::Bytes;

/// 消息体
///
/// 内容保存在 [`Bytes`] 中，克隆开销很小。
/// 每次调用 [`Body::reader`] 都会得到一个从头开始、可 seek 的独立读取器。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Body {
    content: Bytes,
}

impl Body {
    /// 空消息体
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从任意读取源（例如文件）读取全部内容
    ///
    /// 读取是阻塞的
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self {
            content: Bytes::from(buffer),
        })
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// 共享底层缓冲区
    pub fn bytes(&self) -> Bytes {
        self.content.clone()
    }

    /// 新的可 seek 读取器
    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.content.clone())
    }

    /// 以文本形式读取，非法 UTF-8 序列会被替换
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self {
            content: Bytes::from(value),
        }
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self {
            content: Bytes::copy_from_slice(value.as_bytes()),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self {
            content: Bytes::from(value),
        }
    }
}

impl From<Bytes> for Body {
    fn from(content: Bytes) -> Self {
        Self { content }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").field("len", &self.len()).finish()
    }
}

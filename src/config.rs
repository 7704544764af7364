use clap::Parser;
use std::net::{IpAddr, Ipv4Addr};
use tracing::Level;

use crate::frame::{self, Limits};

pub const PORT: u16 = 6379;
pub const BIND: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Parser, Clone, Debug)]
#[command(name = "minidis", version, about = "A minimal RESP server", long_about = None)]
pub struct Config {
    /// The address to bind to
    #[arg(short, long, env = "MINIDIS_BIND", default_value_t = BIND)]
    pub bind: IpAddr,

    /// The port to listen on
    #[arg(short, long, env = "MINIDIS_PORT", default_value_t = PORT)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MINIDIS_LOG_LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,

    /// Maximum nesting of arrays in a request
    #[arg(long, default_value_t = frame::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Maximum number of elements in a request array
    #[arg(long, default_value_t = frame::DEFAULT_MAX_ARRAY_LEN)]
    pub max_array_len: usize,

    /// Maximum length of a bulk string in bytes
    #[arg(long, default_value_t = frame::DEFAULT_MAX_BULK_LEN)]
    pub max_bulk_len: usize,

    /// Maximum length of a CRLF-terminated line in bytes
    #[arg(long, default_value_t = frame::DEFAULT_MAX_LINE_LEN)]
    pub max_line_len: usize,

    /// Maximum encoded size of a whole request in bytes
    #[arg(long, default_value_t = frame::DEFAULT_MAX_FRAME_LEN)]
    pub max_frame_len: usize,
}

impl Config {
    pub fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_depth,
            max_array_len: self.max_array_len,
            max_bulk_len: self.max_bulk_len,
            max_line_len: self.max_line_len,
            max_frame_len: self.max_frame_len,
        }
    }
}

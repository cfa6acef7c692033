mod common;
mod video;

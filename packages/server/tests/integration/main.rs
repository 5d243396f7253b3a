
mod download;
mod search;
mod upload;

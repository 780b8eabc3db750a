pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{
    is_absolute_url, is_excluded, is_templated_url, relative_path, relative_url, resolve_url,
    same_origin, url_directory,
};

//! URL builders for Flickr photo images and pages.
//!
//! Image URLs follow the static farm layout:
//! `https://farm{farm}.staticflickr.com/{server}/{id}_{secret}_{suffix}.jpg`.

use flickrview_types::Photo;

/// Longest-side pixel sizes and their URL suffixes, ascending.
pub const SIZE_SUFFIXES: &[(u32, &str)] = &[
    (75, "s"),
    (100, "t"),
    (150, "q"),
    (240, "m"),
    (320, "n"),
    (500, "-"),
    (640, "z"),
    (800, "c"),
    (1024, "b"),
    (1600, "h"),
    (2048, "k"),
];

/// Suffix used when the caller asks for no particular size.
pub const DEFAULT_SIZE_SUFFIX: &str = "z";

/// Pick the size suffix for a requested longest side.
///
/// An exact match wins; otherwise the largest size not exceeding
/// `longest_side` is used, and anything smaller than the smallest size maps
/// to that smallest size.
pub fn size_suffix_for(longest_side: u32) -> &'static str {
    SIZE_SUFFIXES
        .iter()
        .rev()
        .find(|(size, _)| longest_side >= *size)
        .or_else(|| SIZE_SUFFIXES.first())
        .map(|(_, suffix)| *suffix)
        .unwrap_or(DEFAULT_SIZE_SUFFIX)
}

/// Static image URL for `photo` with an explicit size suffix.
pub fn photo_url(photo: &Photo, size_suffix: &str) -> String {
    format!(
        "https://farm{farm}.staticflickr.com/{server}/{id}_{secret}_{size_suffix}.jpg",
        farm = photo.farm,
        server = photo.server,
        id = photo.id,
        secret = photo.secret,
    )
}

/// Static image URL for `photo` sized by its longest side.
pub fn photo_url_for_size(photo: &Photo, longest_side: u32) -> String {
    photo_url(photo, size_suffix_for(longest_side))
}

pub fn profile_url(user_id: &str) -> String {
    format!("https://www.flickr.com/people/{user_id}/")
}

pub fn photostream_url(user_id: &str) -> String {
    format!("https://www.flickr.com/photos/{user_id}/")
}

pub fn photo_page_url(user_id: &str, photo_id: &str) -> String {
    format!("https://www.flickr.com/photos/{user_id}/{photo_id}")
}

pub fn photosets_url(user_id: &str) -> String {
    format!("https://www.flickr.com/photos/{user_id}/sets/")
}

pub fn photoset_url(user_id: &str, photoset_id: &str) -> String {
    format!("https://www.flickr.com/photos/{user_id}/sets/{photoset_id}")
}

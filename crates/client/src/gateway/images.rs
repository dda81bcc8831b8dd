//! Image URL construction.
//!
//! Pure string building: `{base}/{size}{path}`. Paths from the catalog start
//! with a slash (`/abc.jpg`).

use marquee_core::Movie;

/// Default base for catalog images.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Size tokens understood by the image service.
pub mod sizes {
    pub const POSTER_SMALL: &str = "w185";
    pub const POSTER_MEDIUM: &str = "w342";
    pub const POSTER_LARGE: &str = "w500";

    pub const BACKDROP_SMALL: &str = "w300";
    pub const BACKDROP_MEDIUM: &str = "w780";
    pub const BACKDROP_LARGE: &str = "w1280";

    pub const PROFILE_SMALL: &str = "w45";
    pub const PROFILE_MEDIUM: &str = "w185";
    pub const PROFILE_LARGE: &str = "h632";

    pub const ORIGINAL: &str = "original";

    pub const DEFAULT_POSTER: &str = POSTER_MEDIUM;
    pub const DEFAULT_BACKDROP: &str = BACKDROP_MEDIUM;
    pub const DEFAULT_PROFILE: &str = PROFILE_MEDIUM;
}

/// Builds image URLs against one base.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: String,
}

impl Default for ImageUrls {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE_URL)
    }
}

impl ImageUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { base: base.trim_end_matches('/').to_string() }
    }

    /// URL for `path` at `size`, or `None` when there is no image.
    pub fn image_url(&self, path: Option<&str>, size: &str) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        let separator = if path.starts_with('/') { "" } else { "/" };
        Some(format!("{}/{}{}{}", self.base, size, separator, path))
    }

    pub fn poster_url(&self, movie: &Movie, size: &str) -> Option<String> {
        self.image_url(movie.poster_path.as_deref(), size)
    }

    pub fn backdrop_url(&self, movie: &Movie, size: &str) -> Option<String> {
        self.image_url(movie.backdrop_path.as_deref(), size)
    }

    pub fn profile_url(&self, profile_path: Option<&str>, size: &str) -> Option<String> {
        self.image_url(profile_path, size)
    }

    /// Poster at `sizes::DEFAULT_POSTER` (w342).
    pub fn poster_url_default(&self, movie: &Movie) -> Option<String> {
        self.poster_url(movie, sizes::DEFAULT_POSTER)
    }

    /// Backdrop at `sizes::DEFAULT_BACKDROP` (w780).
    pub fn backdrop_url_default(&self, movie: &Movie) -> Option<String> {
        self.backdrop_url(movie, sizes::DEFAULT_BACKDROP)
    }

    /// Profile photo at `sizes::DEFAULT_PROFILE` (w185).
    pub fn profile_url_default(&self, profile_path: Option<&str>) -> Option<String> {
        self.profile_url(profile_path, sizes::DEFAULT_PROFILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        let images = ImageUrls::default();
        assert_eq!(
            images.image_url(Some("/abc.jpg"), sizes::POSTER_MEDIUM).as_deref(),
            Some("https://image.tmdb.org/t/p/w342/abc.jpg")
        );
    }

    #[test]
    fn test_image_url_absent_path() {
        let images = ImageUrls::default();
        assert_eq!(images.image_url(None, sizes::ORIGINAL), None);
        assert_eq!(images.image_url(Some(""), sizes::ORIGINAL), None);
    }

    #[test]
    fn test_image_url_trailing_slash_base() {
        let images = ImageUrls::new("https://cdn.example.com/img/");
        assert_eq!(
            images.image_url(Some("x.png"), sizes::ORIGINAL).as_deref(),
            Some("https://cdn.example.com/img/original/x.png")
        );
    }

    #[test]
    fn test_movie_helpers() {
        let images = ImageUrls::default();
        let movie = Movie { poster_path: Some("/p.jpg".into()), backdrop_path: None, ..Default::default() };

        assert_eq!(
            images.poster_url(&movie, sizes::POSTER_LARGE).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/p.jpg")
        );
        assert_eq!(images.backdrop_url(&movie, sizes::BACKDROP_MEDIUM), None);
        assert_eq!(
            images.profile_url(Some("/face.jpg"), sizes::PROFILE_LARGE).as_deref(),
            Some("https://image.tmdb.org/t/p/h632/face.jpg")
        );
    }

    #[test]
    fn test_default_sizes() {
        let images = ImageUrls::default();
        let movie =
            Movie { poster_path: Some("/p.jpg".into()), backdrop_path: Some("/b.jpg".into()), ..Default::default() };

        assert_eq!(images.poster_url_default(&movie).as_deref(), Some("https://image.tmdb.org/t/p/w342/p.jpg"));
        assert_eq!(
            images.backdrop_url_default(&movie).as_deref(),
            Some("https://image.tmdb.org/t/p/w780/b.jpg")
        );
        assert_eq!(
            images.profile_url_default(Some("/face.jpg")).as_deref(),
            Some("https://image.tmdb.org/t/p/w185/face.jpg")
        );
        assert_eq!(images.profile_url_default(None), None);
    }
}

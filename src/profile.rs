use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::{photo, Result, TrailError, PHOTO_QUALITY};

/// The single user profile kept on the device.
#[derive(Eq, PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    pub name: String,
    pub location: String,
    pub interests: String,
    /// Compressed JPEG bytes of the profile photo.
    #[serde(
        rename = "imageData",
        default,
        skip_serializing_if = "Option::is_none",
        with = "image_data"
    )]
    image_data: Option<Vec<u8>>,
}

impl Profile {
    pub fn new(name: &str, location: &str, interests: &str) -> Self {
        Self {
            name: name.to_owned(),
            location: location.to_owned(),
            interests: interests.to_owned(),
            image_data: None,
        }
    }

    /// A profile is empty when none of its text fields were filled in.
    /// The photo is not taken into account.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.location.is_empty()
            && self.interests.is_empty()
    }

    /// Compress and keep `image` as the profile photo,
    /// or clear the photo when `None` is given.
    ///
    /// Compression is lossy: [`Profile::photo`] will not
    /// give back the exact pixels passed here.
    pub fn set_photo(&mut self, image: Option<&DynamicImage>) {
        self.image_data = match image {
            None => None,
            Some(image) => match photo::compress(image, PHOTO_QUALITY) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    log::warn!("dropping profile photo: {}", err);
                    None
                }
            },
        };
    }

    /// Decode the stored photo. Every call decodes the bytes anew.
    pub fn photo(&self) -> Option<DynamicImage> {
        let bytes = self.image_data.as_deref()?;
        match photo::decode(bytes) {
            Ok(image) => Some(image),
            Err(err) => {
                log::warn!("stored profile photo is unreadable: {}", err);
                None
            }
        }
    }

    pub fn photo_bytes(&self) -> Option<&[u8]> {
        self.image_data.as_deref()
    }

    pub fn has_photo(&self) -> bool {
        self.image_data.is_some()
    }

    /// Serialize into the persisted blob.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| TrailError::Encode(e.to_string()))
    }

    /// Parse a persisted blob.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(blob)?)
    }
}

/// `imageData` travels as a standard base64 string.
mod image_data {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        data: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match data {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| STANDARD.decode(encoded))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::tests::trail_picture;
    use image::GenericImageView;
    use rstest::rstest;
    use serde_json::Value;

    #[test]
    fn test_default_profile_is_empty() {
        let profile = Profile::default();
        assert!(profile.is_empty());
        assert!(!profile.has_photo());
        assert!(profile.photo().is_none());
    }

    #[rstest]
    #[case("Alex", "", "")]
    #[case("", "Denver", "")]
    #[case("", "", "trails, camping")]
    #[case(" ", "", "")]
    fn test_any_text_field_makes_profile_non_empty(
        #[case] name: &str,
        #[case] location: &str,
        #[case] interests: &str,
    ) {
        assert!(!Profile::new(name, location, interests).is_empty());
    }

    #[test]
    fn test_photo_does_not_count_towards_emptiness() {
        let mut profile = Profile::default();
        profile.set_photo(Some(&trail_picture(8, 8)));
        assert!(profile.has_photo());
        assert!(profile.is_empty());
    }

    #[test]
    fn test_set_photo_and_clear() {
        let mut profile = Profile::new("Alex", "Denver", "trails, camping");
        profile.set_photo(Some(&trail_picture(40, 30)));

        let bytes = profile.photo_bytes().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(profile.photo().unwrap().dimensions(), (40, 30));

        profile.set_photo(None);
        assert!(profile.photo_bytes().is_none());
        assert!(profile.photo().is_none());
    }

    #[test]
    fn test_empty_image_is_not_kept_as_photo() {
        let mut profile = Profile::new("Alex", "Denver", "trails, camping");
        profile.set_photo(Some(&trail_picture(16, 16)));
        assert!(profile.has_photo());

        let empty = DynamicImage::ImageRgb8(image::RgbImage::new(0, 0));
        profile.set_photo(Some(&empty));
        assert!(!profile.has_photo());
        assert!(profile.photo_bytes().is_none());
        assert!(profile.photo().is_none());
    }

    #[test]
    fn test_unreadable_photo_bytes_give_no_photo() {
        let blob = br#"{"name":"Alex","location":"","interests":"","imageData":"AAECAw=="}"#;
        let profile = Profile::from_blob(blob).unwrap();
        assert_eq!(profile.photo_bytes(), Some(&[0u8, 1, 2, 3][..]));
        assert!(profile.photo().is_none());
    }

    #[test]
    fn test_blob_layout() {
        let profile = Profile::new("Alex", "Denver", "trails, camping");
        let blob = profile.to_blob().unwrap();

        let value: Value = serde_json::from_slice(&blob).unwrap();
        assert_eq!(value["name"], "Alex");
        assert_eq!(value["location"], "Denver");
        assert_eq!(value["interests"], "trails, camping");
        assert!(value.get("imageData").map_or(true, Value::is_null));
    }

    #[test]
    fn test_blob_keeps_compressed_photo_bytes() {
        let mut profile = Profile::new("Alex", "Denver", "trails, camping");
        profile.set_photo(Some(&trail_picture(24, 24)));

        let blob = profile.to_blob().unwrap();
        let value: Value = serde_json::from_slice(&blob).unwrap();
        assert!(value["imageData"].is_string());

        let restored = Profile::from_blob(&blob).unwrap();
        assert_eq!(restored, profile);
        assert_eq!(restored.photo_bytes(), profile.photo_bytes());
    }

    #[test]
    fn test_blob_accepts_null_photo_and_unknown_fields() {
        let blob = br#"{
            "name": "Sam",
            "location": "Boulder",
            "interests": "",
            "imageData": null,
            "favoriteTrail": "Mesa"
        }"#;
        let profile = Profile::from_blob(blob).unwrap();
        assert_eq!(profile, Profile::new("Sam", "Boulder", ""));
    }

    #[rstest]
    #[case(&b""[..])]
    #[case(&b"not json"[..])]
    #[case(&br#"{"name":"Sam"}"#[..])]
    #[case(&br#"{"name":1,"location":"","interests":""}"#[..])]
    #[case(&br#"{"name":"","location":"","interests":"","imageData":"%%%"}"#[..])]
    fn test_blob_decode_failures(#[case] blob: &[u8]) {
        assert!(matches!(
            Profile::from_blob(blob),
            Err(TrailError::Decode(_))
        ));
    }
}

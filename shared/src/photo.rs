use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::event::PhotoId;

pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// One photo as the upstream API returns it.
///
/// Every field is optional and a field of the wrong type reads as absent, so
/// decoding a page never fails on a single odd object; defaults are applied
/// in [`ImageRecord::from`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPhoto {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub urls: Option<RawUrls>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<RawUser>,
    #[serde(default, deserialize_with = "lenient")]
    pub likes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUrls {
    #[serde(default, deserialize_with = "lenient")]
    pub small: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub profile_image: Option<RawProfileImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfileImage {
    #[serde(default, deserialize_with = "lenient")]
    pub medium: Option<String>,
}

/// Body of the search endpoint. The listing endpoint returns a bare array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<RawPhoto>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Reads any JSON value, keeping it only if it has the expected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Like [`lenient`], but numeric ids are kept in their decimal form.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

/// Normalized photo handed to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: PhotoId,
    pub image_url: String,
    pub author_name: String,
    pub author_image: String,
    pub like_count: u64,
}

impl From<RawPhoto> for ImageRecord {
    fn from(raw: RawPhoto) -> Self {
        let (author_name, author_image) = match raw.user {
            Some(user) => (
                user.name,
                user.profile_image.and_then(|image| image.medium),
            ),
            None => (None, None),
        };

        Self {
            id: PhotoId::new(raw.id.unwrap_or_default()),
            image_url: raw.urls.and_then(|urls| urls.small).unwrap_or_default(),
            author_name: author_name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            author_image: author_image.unwrap_or_default(),
            like_count: raw.likes.unwrap_or(0),
        }
    }
}

pub fn normalize_all(raw: Vec<RawPhoto>) -> Vec<ImageRecord> {
    raw.into_iter().map(ImageRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn full_object_maps_every_field() {
        let raw: RawPhoto = serde_json::from_value(serde_json::json!({
            "id": "abc123",
            "urls": { "small": "https://images.example.com/abc-small.jpg", "raw": "ignored" },
            "user": {
                "name": "Ada",
                "profile_image": { "medium": "https://images.example.com/ada.jpg" }
            },
            "likes": 42
        }))
        .unwrap();

        let record = ImageRecord::from(raw);
        assert_eq!(record.id.as_str(), "abc123");
        assert_eq!(record.image_url, "https://images.example.com/abc-small.jpg");
        assert_eq!(record.author_name, "Ada");
        assert_eq!(record.author_image, "https://images.example.com/ada.jpg");
        assert_eq!(record.like_count, 42);
    }

    #[test]
    fn missing_user_likes_and_urls_use_defaults() {
        let raw: RawPhoto = serde_json::from_str(r#"{ "id": "x" }"#).unwrap();
        let record = ImageRecord::from(raw);

        assert_eq!(record.author_name, UNKNOWN_AUTHOR);
        assert_eq!(record.author_image, "");
        assert_eq!(record.image_url, "");
        assert_eq!(record.like_count, 0);
    }

    #[test]
    fn nulls_are_treated_as_absent() {
        let raw: RawPhoto = serde_json::from_str(
            r#"{ "id": "x", "urls": null, "user": { "name": null, "profile_image": null }, "likes": null }"#,
        )
        .unwrap();
        let record = ImageRecord::from(raw);

        assert_eq!(record.author_name, UNKNOWN_AUTHOR);
        assert_eq!(record.author_image, "");
        assert_eq!(record.like_count, 0);
    }

    #[test]
    fn wrongly_typed_fields_read_as_absent() {
        let raw: RawPhoto = serde_json::from_value(serde_json::json!({
            "id": 42,
            "urls": "not-an-object",
            "user": { "name": ["Ada"], "profile_image": { "medium": 7 } },
            "likes": 3.5
        }))
        .unwrap();
        let record = ImageRecord::from(raw);

        assert_eq!(record.id.as_str(), "42");
        assert_eq!(record.image_url, "");
        assert_eq!(record.author_name, UNKNOWN_AUTHOR);
        assert_eq!(record.author_image, "");
        assert_eq!(record.like_count, 0);
    }

    #[test]
    fn one_odd_object_does_not_fail_the_page() {
        let page: Vec<RawPhoto> = serde_json::from_str(
            r#"[{ "id": "a", "likes": 5 }, { "id": "b", "likes": -1 }, { "id": { "x": 1 } }]"#,
        )
        .unwrap();
        let records = normalize_all(page);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].like_count, 5);
        assert_eq!(records[1].like_count, 0);
        assert_eq!(records[2].id.as_str(), "");
    }

    #[test]
    fn serializes_in_camel_case() {
        let record = ImageRecord::from(RawPhoto {
            id: Some("p1".into()),
            ..RawPhoto::default()
        });
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], "p1");
        assert_eq!(json["authorName"], UNKNOWN_AUTHOR);
        assert_eq!(json["authorImage"], "");
        assert_eq!(json["imageUrl"], "");
        assert_eq!(json["likeCount"], 0);
    }

    #[test]
    fn search_response_requires_results() {
        assert!(serde_json::from_str::<SearchResponse>(r#"{ "total": 3 }"#).is_err());

        let empty: SearchResponse = serde_json::from_str(r#"{ "results": [] }"#).unwrap();
        assert!(empty.results.is_empty());
        assert_eq!(empty.total_pages, None);
    }

    fn arb_raw_photo() -> impl Strategy<Value = RawPhoto> {
        (
            proptest::option::of("[a-zA-Z0-9_-]{0,12}"),
            proptest::option::of(proptest::option::of(".{0,20}")),
            proptest::option::of((
                proptest::option::of(".{0,20}"),
                proptest::option::of(proptest::option::of(".{0,20}")),
            )),
            proptest::option::of(any::<u64>()),
        )
            .prop_map(|(id, urls, user, likes)| RawPhoto {
                id,
                urls: urls.map(|small| RawUrls { small }),
                user: user.map(|(name, profile_image)| RawUser {
                    name,
                    profile_image: profile_image.map(|medium| RawProfileImage { medium }),
                }),
                likes,
            })
    }

    proptest! {
        #[test]
        fn normalization_is_total(raw in arb_raw_photo()) {
            let expected_name = raw
                .user
                .as_ref()
                .and_then(|u| u.name.clone())
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
            let expected_url = raw
                .urls
                .as_ref()
                .and_then(|u| u.small.clone())
                .unwrap_or_default();
            let expected_likes = raw.likes.unwrap_or(0);

            let record = ImageRecord::from(raw);

            prop_assert_eq!(record.author_name, expected_name);
            prop_assert_eq!(record.image_url, expected_url);
            prop_assert_eq!(record.like_count, expected_likes);
        }
    }
}

//! People lookup: resolve what the user typed to an NSID, then show the
//! person's profile links and public photos from the local cache when it is
//! fresh enough.

use axum::extract::{Query, State};
use axum::response::Html;
use flickrview_types::{Person, Photo};
use flickrview_util::{photosets_url, photostream_url, profile_url};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::photos::PhotoView;
use crate::{AppError, AppState, templates};

pub const MAX_INPUT_LENGTH: usize = 255;

/// Raw query of the people form. Numbers stay strings so bad input is
/// reported on the form instead of rejected by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeopleQuery {
    #[serde(default)]
    pub user_id_or_url: Option<String>,
    #[serde(default)]
    pub per_page: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

/// A validated people lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleLookup {
    pub input: String,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl PeopleLookup {
    /// Paged lookups bypass the cache, which only holds the first page.
    pub fn is_paged(&self) -> bool {
        self.per_page.is_some() || self.page.is_some()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn positive(value: &Option<String>, field: &'static str, errors: &mut IndexMap<&'static str, String>) -> Option<u32> {
    let raw = present(value)?;
    match raw.parse::<u32>() {
        Ok(number) if number >= 1 => Some(number),
        _ => {
            errors.insert(field, "Enter a whole number of at least 1.".to_string());
            None
        }
    }
}

impl PeopleQuery {
    /// No lookup was requested; only the empty form is shown.
    pub fn is_blank(&self) -> bool {
        present(&self.user_id_or_url).is_none() && present(&self.per_page).is_none() && present(&self.page).is_none()
    }

    /// Validate the query, collecting one message per bad field.
    pub fn parse(&self) -> Result<PeopleLookup, IndexMap<&'static str, String>> {
        let mut errors = IndexMap::new();
        let input = match present(&self.user_id_or_url) {
            None => {
                errors.insert("user_id_or_url", "This field is required.".to_string());
                None
            }
            Some(input) if input.chars().count() > MAX_INPUT_LENGTH => {
                errors.insert(
                    "user_id_or_url",
                    format!("Ensure this value has at most {MAX_INPUT_LENGTH} characters."),
                );
                None
            }
            Some(input) => Some(input.to_string()),
        };
        let per_page = positive(&self.per_page, "per_page", &mut errors);
        let page = positive(&self.page, "page", &mut errors);

        match input {
            Some(input) if errors.is_empty() => Ok(PeopleLookup { input, per_page, page }),
            _ => Err(errors),
        }
    }
}

/// How a typed user reference is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserReference<'a> {
    /// A profile or photostream URL, resolved with `urls.lookupUser`.
    Url(&'a str),
    /// Already an NSID.
    Nsid(&'a str),
    /// A screen name, resolved with `people.findByUsername`.
    Username(&'a str),
}

pub fn classify(input: &str) -> UserReference<'_> {
    let input = input.trim();
    let lowered = input.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") || lowered.contains("flickr.com/") {
        UserReference::Url(input)
    } else if input.contains("@N") {
        UserReference::Nsid(input)
    } else {
        UserReference::Username(input)
    }
}

fn user_id_from(payload: &Value) -> Result<String, AppError> {
    ["/user/nsid", "/user/id"]
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| AppError::Payload("user lookup returned no id".into()))
}

/// Resolve typed input to an NSID, calling Flickr when needed.
pub async fn resolve_user_id(state: &AppState, input: &str) -> Result<String, AppError> {
    match classify(input) {
        UserReference::Nsid(nsid) => Ok(nsid.to_string()),
        UserReference::Url(url) => {
            let payload = state.call("urls.lookupUser", &[("url", url)], "user").await?;
            user_id_from(&payload)
        }
        UserReference::Username(username) => {
            let payload = state
                .call("people.findByUsername", &[("username", username)], "user")
                .await?;
            user_id_from(&payload)
        }
    }
}

/// Return the person record and whether it came from the cache.
pub async fn load_person(state: &AppState, nsid: &str, lookup: &PeopleLookup) -> Result<(Person, bool), AppError> {
    if !lookup.is_paged()
        && let Some(person) = state.cached_person(nsid).await?
        && !person.needs_update()
    {
        debug!(%nsid, "serving cached person");
        return Ok((person, true));
    }

    let info = state.call("people.getInfo", &[("user_id", nsid)], "person").await?;
    let info = info
        .get("person")
        .cloned()
        .ok_or_else(|| AppError::Payload("people.getInfo returned no person".into()))?;

    let per_page = lookup.per_page.map(|value| value.to_string());
    let page = lookup.page.map(|value| value.to_string());
    let mut arguments = vec![("user_id", nsid)];
    if let Some(per_page) = per_page.as_deref() {
        arguments.push(("per_page", per_page));
    }
    if let Some(page) = page.as_deref() {
        arguments.push(("page", page));
    }
    let photos = state.call("people.getPublicPhotos", &arguments, "person").await?;
    let photos = photos.pointer("/photos/photo").cloned().unwrap_or_else(|| json!([]));

    let person = Person::new(nsid, info, photos);
    if lookup.is_paged() {
        return Ok((person, false));
    }
    info!(%nsid, "refreshed cached person");
    Ok((state.save_person(person).await?, false))
}

fn render_people(
    query: &PeopleQuery,
    errors: &IndexMap<&'static str, String>,
    person: Option<(&Person, bool)>,
) -> Result<Html<String>, AppError> {
    let (person_context, photos) = match person {
        Some((person, cached)) => {
            let photos: Vec<Photo> = serde_json::from_value(person.photos.clone())
                .map_err(|e| AppError::Payload(format!("cached photos of {}: {e}", person.flickr_id)))?;
            let views: Vec<PhotoView> = photos
                .iter()
                .map(|photo| PhotoView::new(photo, &person.flickr_id))
                .collect();
            let context = json!({
                "nsid": person.flickr_id,
                "name": person.display_name(),
                "profile_url": profile_url(&person.flickr_id),
                "photostream_url": photostream_url(&person.flickr_id),
                "photosets_url": photosets_url(&person.flickr_id),
                "updated_at": person.updated_at.to_rfc3339(),
                "cached": cached,
            });
            (Some(context), views)
        }
        None => (None, Vec::new()),
    };
    let page = templates::render(
        "people.html",
        &json!({"query": query, "errors": errors, "person": person_context, "photos": photos}),
    )?;
    Ok(Html(page))
}

/// `GET /` and `GET /people`.
pub async fn people(State(state): State<AppState>, Query(query): Query<PeopleQuery>) -> Result<Html<String>, AppError> {
    if query.is_blank() {
        return render_people(&query, &IndexMap::new(), None);
    }
    let lookup = match query.parse() {
        Ok(lookup) => lookup,
        Err(errors) => return render_people(&query, &errors, None),
    };
    let nsid = resolve_user_id(&state, &lookup.input).await?;
    let (person, cached) = load_person(&state, &nsid, &lookup).await?;
    render_people(&query, &IndexMap::new(), Some((&person, cached)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(user: Option<&str>, per_page: Option<&str>, page: Option<&str>) -> PeopleQuery {
        PeopleQuery {
            user_id_or_url: user.map(str::to_string),
            per_page: per_page.map(str::to_string),
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn classifies_user_references() {
        assert_eq!(
            classify("https://www.flickr.com/photos/someone/"),
            UserReference::Url("https://www.flickr.com/photos/someone/")
        );
        assert_eq!(
            classify("flickr.com/people/someone"),
            UserReference::Url("flickr.com/people/someone")
        );
        assert_eq!(classify(" 12345678@N00 "), UserReference::Nsid("12345678@N00"));
        assert_eq!(classify("someone"), UserReference::Username("someone"));
    }

    #[test]
    fn parses_valid_lookup() {
        let lookup = query(Some(" someone "), Some("20"), None).parse().unwrap();
        assert_eq!(
            lookup,
            PeopleLookup {
                input: "someone".into(),
                per_page: Some(20),
                page: None
            }
        );
        assert!(lookup.is_paged());
        assert!(!query(Some("someone"), Some(""), None).parse().unwrap().is_paged());
    }

    #[test]
    fn reports_every_bad_field() {
        let errors = query(None, Some("0"), Some("two")).parse().unwrap_err();
        let fields: Vec<_> = errors.keys().copied().collect();
        assert_eq!(fields, ["user_id_or_url", "per_page", "page"]);

        let long = "x".repeat(MAX_INPUT_LENGTH + 1);
        let errors = query(Some(&long), None, None).parse().unwrap_err();
        assert!(errors["user_id_or_url"].contains("255"));
    }

    #[test]
    fn blank_query_shows_empty_form() {
        assert!(PeopleQuery::default().is_blank());
        assert!(query(Some("  "), None, None).is_blank());
        assert!(!query(None, Some("5"), None).is_blank());
    }

    #[test]
    fn reads_user_id_from_either_lookup_shape() {
        assert_eq!(
            user_id_from(&json!({"user": {"id": "1@N01", "nsid": "1@N01"}})).unwrap(),
            "1@N01"
        );
        assert_eq!(user_id_from(&json!({"user": {"id": "2@N02"}})).unwrap(), "2@N02");
        assert!(user_id_from(&json!({"stat": "ok"})).is_err());
    }
}

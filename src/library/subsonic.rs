//! Subsonic REST API client
//!
//! Every request carries salted token authentication: `t = md5(password + salt)`
//! with a fresh random salt per request, plus the client id and API version.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::Url;
use serde::{Deserialize, Deserializer};

use super::LibraryPort;
use crate::config::Config;
use crate::error::PortError;
use crate::model::Track;

const SALT_LEN: usize = 12;
const COVER_ART_SIZE: u32 = 300;

#[derive(Clone)]
pub struct SubsonicClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    client_id: String,
    api_version: String,
}

impl SubsonicClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.player.http_timeout))
            .build()?;

        Ok(Self {
            http,
            base_url: config.server.url.trim().trim_end_matches('/').to_string(),
            username: config.server.username.clone(),
            password: config.server.password.clone(),
            client_id: config.client.id.clone(),
            api_version: config.client.api_version.clone(),
        })
    }

    fn make_salt() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LEN)
            .map(char::from)
            .collect()
    }

    fn auth_params(&self, salt: &str) -> Vec<(&'static str, String)> {
        let token = format!("{:x}", md5::compute(format!("{}{}", self.password, salt)));
        vec![
            ("u", self.username.clone()),
            ("t", token),
            ("s", salt.to_string()),
            ("f", "json".to_string()),
            ("v", self.api_version.clone()),
            ("c", self.client_id.clone()),
        ]
    }

    fn api_url(&self, method: &str, params: &[(&'static str, String)]) -> Result<Url, PortError> {
        let mut query = self.auth_params(&Self::make_salt());
        query.extend(params.iter().cloned());

        Url::parse_with_params(&format!("{}/rest/{}.view", self.base_url, method), &query)
            .map_err(|e| PortError::Decode(format!("invalid server url: {e}")))
    }

    async fn request(
        &self,
        method: &str,
        params: &[(&'static str, String)],
    ) -> Result<ResponseBody, PortError> {
        let url = self.api_url(method, params)?;
        tracing::debug!(method, "Subsonic request started");

        let response = self.http.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        parse_envelope(&bytes)
    }
}

#[async_trait]
impl LibraryPort for SubsonicClient {
    async fn get_random_songs(&self, count: usize) -> Result<Vec<Track>, PortError> {
        let body = self
            .request("getRandomSongs", &[("size", count.to_string())])
            .await?;
        Ok(body.random_songs.map(SongList::into_tracks).unwrap_or_default())
    }

    async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<Track>, PortError> {
        let params = [
            ("query", query.to_string()),
            ("songCount", limit.to_string()),
            ("albumCount", "0".to_string()),
            ("artistCount", "0".to_string()),
        ];
        let body = self.request("search3", &params).await?;
        Ok(body.search_result3.map(SongList::into_tracks).unwrap_or_default())
    }

    async fn get_play_url(&self, track_id: &str) -> Result<String, PortError> {
        Ok(self.api_url("stream", &[("id", track_id.to_string())])?.into())
    }

    fn get_cover_art_url(&self, cover_art_id: &str) -> Result<String, PortError> {
        let params = [
            ("id", cover_art_id.to_string()),
            ("size", COVER_ART_SIZE.to_string()),
        ];
        Ok(self.api_url("getCoverArt", &params)?.into())
    }

    async fn ping(&self) -> Result<(), PortError> {
        self.request("ping", &[]).await.map(|_| ())
    }
}

fn parse_envelope(bytes: &[u8]) -> Result<ResponseBody, PortError> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    let body = envelope.response;
    if body.status != "ok" {
        let error = body.error.unwrap_or_default();
        return Err(PortError::Api {
            code: error.code,
            message: error.message,
        });
    }
    Ok(body)
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "subsonic-response")]
    response: ResponseBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody {
    status: String,
    error: Option<ApiError>,
    random_songs: Option<SongList>,
    search_result3: Option<SongList>,
}

#[derive(Deserialize, Default)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct SongList {
    #[serde(default, deserialize_with = "one_or_many")]
    song: Vec<SongDto>,
}

impl SongList {
    fn into_tracks(self) -> Vec<Track> {
        self.song
            .into_iter()
            .filter(|song| !song.is_video)
            .map(Track::from)
            .collect()
    }
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SongDto {
    id: String,
    title: String,
    artist: String,
    album: String,
    duration: u32,
    track: u32,
    size: u64,
    bit_rate: u32,
    sampling_rate: u32,
    channel_count: u32,
    content_type: String,
    suffix: String,
    path: String,
    cover_art: Option<String>,
    play_count: u32,
    created: Option<String>,
    played: Option<String>,
    is_video: bool,
}

impl From<SongDto> for Track {
    fn from(song: SongDto) -> Self {
        Track {
            id: song.id,
            title: song.title,
            artist: song.artist,
            album: song.album,
            duration: song.duration,
            track_number: song.track,
            size: song.size,
            bit_rate: song.bit_rate,
            sample_rate: song.sampling_rate,
            channel_count: song.channel_count,
            content_type: song.content_type,
            suffix: song.suffix,
            path: song.path,
            cover_art: song.cover_art,
            play_count: song.play_count,
            created: song.created.as_deref().and_then(parse_timestamp),
            played: song.played.as_deref().and_then(parse_timestamp),
        }
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Older servers send a single object instead of a one-element array.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SubsonicClient {
        let config = Config::from_toml_str(
            r#"
            [server]
            url = "https://music.example.com/"
            username = "alice"
            password = "sesame"
            "#,
        )
        .unwrap();
        SubsonicClient::new(&config).unwrap()
    }

    #[test]
    fn token_is_md5_of_password_and_salt() {
        let client = client();
        let params = client.auth_params("c19b2d");
        let token = params.iter().find(|(k, _)| *k == "t").map(|(_, v)| v.clone());
        let expected = format!("{:x}", md5::compute("sesamec19b2d"));
        assert_eq!(token, Some(expected));
        assert!(params.contains(&("u", "alice".to_string())));
        assert!(params.contains(&("f", "json".to_string())));
        assert!(params.contains(&("v", "1.16.1".to_string())));
    }

    #[test]
    fn salts_are_fresh() {
        let a = SubsonicClient::make_salt();
        let b = SubsonicClient::make_salt();
        assert_eq!(a.len(), SALT_LEN);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn play_url_targets_stream_endpoint() {
        let client = client();
        let url = Url::parse(&client.get_play_url("tr-42").await.unwrap()).unwrap();
        assert_eq!(url.path(), "/rest/stream.view");
        assert!(url.query_pairs().any(|(k, v)| k == "id" && v == "tr-42"));
        assert!(url.query_pairs().any(|(k, _)| k == "t"));
    }

    #[test]
    fn parses_search_results() {
        let json = br#"{"subsonic-response":{"status":"ok","version":"1.16.1",
            "searchResult3":{"song":[
                {"id":"1","title":"One","artist":"A","album":"X","duration":200,
                 "bitRate":320,"samplingRate":44100,"suffix":"mp3",
                 "created":"2023-04-01T10:00:00.000Z"},
                {"id":"2","title":"Clip","isVideo":true}
            ]}}}"#;

        let body = parse_envelope(json).unwrap();
        let tracks = body.search_result3.unwrap().into_tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "One");
        assert_eq!(tracks[0].duration, 200);
        assert_eq!(tracks[0].sample_rate, 44100);
        assert!(tracks[0].created.is_some());
    }

    #[test]
    fn single_song_object_is_accepted() {
        let json = br#"{"subsonic-response":{"status":"ok",
            "randomSongs":{"song":{"id":"9","title":"Solo"}}}}"#;
        let tracks = parse_envelope(json).unwrap().random_songs.unwrap().into_tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "9");
    }

    #[test]
    fn failed_status_maps_to_api_error() {
        let json = br#"{"subsonic-response":{"status":"failed",
            "error":{"code":40,"message":"Wrong username or password"}}}"#;
        match parse_envelope(json) {
            Err(PortError::Api { code, message }) => {
                assert_eq!(code, 40);
                assert_eq!(message, "Wrong username or password");
            }
            _ => panic!("expected api error"),
        }
    }
}

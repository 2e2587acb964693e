//! API endpoint layout
//!
//! One variant per remote resource. Identifiers are percent-encoded as single
//! path segments when the endpoint is resolved against a base URL.

use crate::error::{Error, Result};
use crate::types::FeedKind;
use std::fmt;
use url::Url;

/// A remote resource of the shots API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `/shots/everyone`
    EveryoneShots,
    /// `/shots/popular`
    PopularShots,
    /// `/shots/debuts`
    DebutShots,
    /// `/shots/{id}`
    Shot(String),
    /// `/shots/{id}/comments`
    ShotComments(String),
    /// `/players/{player}/shots`
    PlayerShots(String),
    /// `/players/{player}/shots/following`
    FollowedPlayerShots(String),
    /// `/players/{player}/shots/likes`
    PlayerLikes(String),
    /// `/players/{player}`
    Player(String),
    /// `/players/{player}/followers`
    Followers(String),
    /// `/players/{player}/following`
    Following(String),
    /// `/players/{player}/draftees`
    Draftees(String),
}

impl Endpoint {
    /// Endpoint listing shots for a feed kind
    pub fn for_feed(kind: FeedKind, player: Option<&str>) -> Result<Self> {
        let player = || {
            player
                .filter(|p| !p.is_empty())
                .map(ToString::to_string)
                .ok_or_else(|| Error::missing_player(kind.as_str()))
        };

        Ok(match kind {
            FeedKind::Everyone => Endpoint::EveryoneShots,
            FeedKind::Popular => Endpoint::PopularShots,
            FeedKind::Debut => Endpoint::DebutShots,
            FeedKind::FollowedPlayerShots => Endpoint::FollowedPlayerShots(player()?),
            FeedKind::LikesForPlayerShots => Endpoint::PlayerLikes(player()?),
        })
    }

    /// Path segments, unencoded
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::EveryoneShots => vec!["shots", "everyone"],
            Endpoint::PopularShots => vec!["shots", "popular"],
            Endpoint::DebutShots => vec!["shots", "debuts"],
            Endpoint::Shot(id) => vec!["shots", id.as_str()],
            Endpoint::ShotComments(id) => vec!["shots", id.as_str(), "comments"],
            Endpoint::PlayerShots(p) => vec!["players", p.as_str(), "shots"],
            Endpoint::FollowedPlayerShots(p) => vec!["players", p.as_str(), "shots", "following"],
            Endpoint::PlayerLikes(p) => vec!["players", p.as_str(), "shots", "likes"],
            Endpoint::Player(p) => vec!["players", p.as_str()],
            Endpoint::Followers(p) => vec!["players", p.as_str(), "followers"],
            Endpoint::Following(p) => vec!["players", p.as_str(), "following"],
            Endpoint::Draftees(p) => vec!["players", p.as_str(), "draftees"],
        }
    }

    /// Resolve against a base URL, appending the encoded segments to its path
    pub fn url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base)?;
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("base URL cannot carry a path: {base}")))?
            .pop_if_empty()
            .extend(self.segments());
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments().join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Endpoint::EveryoneShots, "/shots/everyone")]
    #[test_case(Endpoint::PopularShots, "/shots/popular")]
    #[test_case(Endpoint::DebutShots, "/shots/debuts")]
    #[test_case(Endpoint::Shot("21603".into()), "/shots/21603")]
    #[test_case(Endpoint::ShotComments("21603".into()), "/shots/21603/comments")]
    #[test_case(Endpoint::PlayerShots("simplebits".into()), "/players/simplebits/shots")]
    #[test_case(Endpoint::FollowedPlayerShots("simplebits".into()), "/players/simplebits/shots/following")]
    #[test_case(Endpoint::PlayerLikes("simplebits".into()), "/players/simplebits/shots/likes")]
    #[test_case(Endpoint::Player("simplebits".into()), "/players/simplebits")]
    #[test_case(Endpoint::Followers("simplebits".into()), "/players/simplebits/followers")]
    #[test_case(Endpoint::Following("simplebits".into()), "/players/simplebits/following")]
    #[test_case(Endpoint::Draftees("simplebits".into()), "/players/simplebits/draftees")]
    fn test_endpoint_paths(endpoint: Endpoint, expected: &str) {
        assert_eq!(endpoint.to_string(), expected);
    }

    #[test]
    fn test_for_feed() {
        assert_eq!(
            Endpoint::for_feed(FeedKind::Popular, None).unwrap(),
            Endpoint::PopularShots
        );
        assert_eq!(
            Endpoint::for_feed(FeedKind::Everyone, Some("ignored")).unwrap(),
            Endpoint::EveryoneShots
        );
        assert_eq!(
            Endpoint::for_feed(FeedKind::LikesForPlayerShots, Some("dan")).unwrap(),
            Endpoint::PlayerLikes("dan".into())
        );
        assert!(matches!(
            Endpoint::for_feed(FeedKind::FollowedPlayerShots, None),
            Err(Error::MissingPlayer { .. })
        ));
        assert!(matches!(
            Endpoint::for_feed(FeedKind::FollowedPlayerShots, Some("")),
            Err(Error::MissingPlayer { .. })
        ));
    }

    #[test]
    fn test_url_encodes_segments() {
        let url = Endpoint::Player("jane doe/x".into())
            .url("https://api.dribbble.com")
            .unwrap();
        assert_eq!(url.as_str(), "https://api.dribbble.com/players/jane%20doe%2Fx");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let url = Endpoint::PopularShots
            .url("http://127.0.0.1:8080/v1/")
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v1/shots/popular");
    }
}

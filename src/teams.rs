use std::collections::HashMap;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use once_cell::sync::Lazy;

use crate::errors::GdtError;

/// One NHL franchise: canonical code plus everything needed to address it upstream.
#[derive(Debug, PartialEq, Eq)]
pub struct TeamIdentity {
    /// Three-letter code used by the stats API (`NYR`)
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub nickname: &'static str,
    /// Path segment on the line-combinations site
    pub slug: &'static str,
    pub logo_url: &'static str,
    /// Short forms fans actually type; city/nickname/name/code are implied
    pub aliases: &'static [&'static str],
}

impl TeamIdentity {
    /// Whether `full_name` (as reported by the stats API) refers to this team.
    pub fn matches_full_name(&self, full_name: &str) -> bool {
        let n = normalize(full_name);
        n == normalize(self.name) || self.aliases.iter().any(|a| normalize(a) == n)
    }
}

macro_rules! logo {
    ($path:literal) => {
        concat!("//media.invisioncic.com/c316106/", $path)
    };
}

pub static TEAMS: &[TeamIdentity] = &[
    // Metropolitan
    TeamIdentity { code: "CAR", name: "Carolina Hurricanes", city: "Carolina", nickname: "Hurricanes", slug: "carolina-hurricanes", logo_url: logo!("monthly_2021_09/gdt-logos-car.png.9275f196cd692cf0401852115615f87b.png"), aliases: &["canes", "raleigh"] },
    TeamIdentity { code: "CBJ", name: "Columbus Blue Jackets", city: "Columbus", nickname: "Blue Jackets", slug: "columbus-blue-jackets", logo_url: logo!("monthly_2021_09/gdt-logos-cbj.png.0019056d85e2d1a7b9fed8ccbfc08ab5.png"), aliases: &["jackets", "cbj"] },
    TeamIdentity { code: "NJD", name: "New Jersey Devils", city: "New Jersey", nickname: "Devils", slug: "new-jersey-devils", logo_url: logo!("monthly_2021_09/gdt-logos-njd.png.995541c7bd89e48ab72a5b888a62c32f.png"), aliases: &["nj", "jersey"] },
    TeamIdentity { code: "NYI", name: "New York Islanders", city: "New York", nickname: "Islanders", slug: "new-york-islanders", logo_url: logo!("monthly_2021_09/gdt-logos-nyi.png.3558ca3bb0b5ff4bfbc066e65b9d8079.png"), aliases: &["isles", "long island"] },
    TeamIdentity { code: "NYR", name: "New York Rangers", city: "New York", nickname: "Rangers", slug: "new-york-rangers", logo_url: logo!("monthly_2021_09/gdt-logos-nyr.png.361dbab7a8ecf15de4e4b3a41c339331.png"), aliases: &["blueshirts", "broadway blueshirts"] },
    TeamIdentity { code: "PHI", name: "Philadelphia Flyers", city: "Philadelphia", nickname: "Flyers", slug: "philadelphia-flyers", logo_url: logo!("monthly_2021_09/gdt-logos-phi.png.1d82a65c8446787bf7437b955ff134b7.png"), aliases: &["philly"] },
    TeamIdentity { code: "PIT", name: "Pittsburgh Penguins", city: "Pittsburgh", nickname: "Penguins", slug: "pittsburgh-penguins", logo_url: logo!("monthly_2021_09/gdt-logos-pit.png.cc1de7bfb6706e84d860f54e886b3911.png"), aliases: &["pens"] },
    TeamIdentity { code: "WSH", name: "Washington Capitals", city: "Washington", nickname: "Capitals", slug: "washington-capitals", logo_url: logo!("monthly_2021_09/gdt-logos-wsh.png.9e2e91c1b04fee71e9afc923cfc83973.png"), aliases: &["caps", "was"] },
    // Atlantic
    TeamIdentity { code: "BOS", name: "Boston Bruins", city: "Boston", nickname: "Bruins", slug: "boston-bruins", logo_url: logo!("monthly_2021_09/gdt-logos-bos.png.9245743e69b7ab2a6fa56f66373a9417.png"), aliases: &["b's"] },
    TeamIdentity { code: "BUF", name: "Buffalo Sabres", city: "Buffalo", nickname: "Sabres", slug: "buffalo-sabres", logo_url: logo!("monthly_2021_09/gdt-logos-buf.png.74b16b6cea5f0178680004507f29d0eb.png"), aliases: &[] },
    TeamIdentity { code: "DET", name: "Detroit Red Wings", city: "Detroit", nickname: "Red Wings", slug: "detroit-red-wings", logo_url: logo!("monthly_2021_09/gdt-logos-det.png.a69165f4270e6f15fa6860e115e37720.png"), aliases: &["wings"] },
    TeamIdentity { code: "FLA", name: "Florida Panthers", city: "Florida", nickname: "Panthers", slug: "florida-panthers", logo_url: logo!("monthly_2021_09/gdt-logos-fla.png.d9422e531543403ed33e88b10cc48af6.png"), aliases: &["cats", "fla"] },
    TeamIdentity { code: "MTL", name: "Montreal Canadiens", city: "Montreal", nickname: "Canadiens", slug: "montreal-canadiens", logo_url: logo!("monthly_2021_09/gdt-logos-mtl.png.76ee659aed4e8a8a3c9a45717773e7a1.png"), aliases: &["habs", "montréal", "montréal canadiens", "mon"] },
    TeamIdentity { code: "OTT", name: "Ottawa Senators", city: "Ottawa", nickname: "Senators", slug: "ottawa-senators", logo_url: logo!("monthly_2021_09/gdt-logos-ott.png.30279696b5a596d2471e77be9b32c3c3.png"), aliases: &["sens"] },
    TeamIdentity { code: "TBL", name: "Tampa Bay Lightning", city: "Tampa Bay", nickname: "Lightning", slug: "tampa-bay-lightning", logo_url: logo!("monthly_2021_09/gdt-logos-tbl.png.c002d0a6ddc76500f0088b5bbd848f25.png"), aliases: &["bolts", "tampa", "tb"] },
    TeamIdentity { code: "TOR", name: "Toronto Maple Leafs", city: "Toronto", nickname: "Maple Leafs", slug: "toronto-maple-leafs", logo_url: logo!("monthly_2021_09/gdt-logos-tor.png.4277ed0b6abaa8a22da800e1c7e44074.png"), aliases: &["leafs"] },
    // Central
    TeamIdentity { code: "ARI", name: "Arizona Coyotes", city: "Arizona", nickname: "Coyotes", slug: "arizona-coyotes", logo_url: "", aliases: &["yotes", "phoenix"] },
    TeamIdentity { code: "CHI", name: "Chicago Blackhawks", city: "Chicago", nickname: "Blackhawks", slug: "chicago-blackhawks", logo_url: logo!("monthly_2021_09/gdt-logos-chi.png.edec18d1a7e150d08338c7a66e8312e6.png"), aliases: &["hawks"] },
    TeamIdentity { code: "COL", name: "Colorado Avalanche", city: "Colorado", nickname: "Avalanche", slug: "colorado-avalanche", logo_url: logo!("monthly_2021_09/gdt-logos-col.png.922f5df84a60dc71e5a4489a25c304d1.png"), aliases: &["avs", "denver"] },
    TeamIdentity { code: "DAL", name: "Dallas Stars", city: "Dallas", nickname: "Stars", slug: "dallas-stars", logo_url: logo!("monthly_2021_09/gdt-logos-dal.png.4a83ae6b7cc3f2457dae3ffe380d7513.png"), aliases: &[] },
    TeamIdentity { code: "MIN", name: "Minnesota Wild", city: "Minnesota", nickname: "Wild", slug: "minnesota-wild", logo_url: logo!("monthly_2021_09/gdt-logos-min.png.5d3e06f2ddf7bfda4207af327a93b09e.png"), aliases: &[] },
    TeamIdentity { code: "NSH", name: "Nashville Predators", city: "Nashville", nickname: "Predators", slug: "nashville-predators", logo_url: logo!("monthly_2021_09/gdt-logos-nsh.png.263531c037486a4a0775475e2c666696.png"), aliases: &["preds", "nas"] },
    TeamIdentity { code: "STL", name: "St. Louis Blues", city: "St. Louis", nickname: "Blues", slug: "st-louis-blues", logo_url: logo!("monthly_2021_09/gdt-logos-stl.png.be1ee6e3201adb94164ca1be4194a331.png"), aliases: &["saint louis", "saint louis blues"] },
    TeamIdentity { code: "UTA", name: "Utah Mammoth", city: "Utah", nickname: "Mammoth", slug: "utah-mammoth", logo_url: logo!("monthly_2026_01/Utah_Mam.png.51f6ebab37070cd7c4de6552f2fdf246.png"), aliases: &["utah hockey club", "utah hc", "salt lake"] },
    TeamIdentity { code: "WPG", name: "Winnipeg Jets", city: "Winnipeg", nickname: "Jets", slug: "winnipeg-jets", logo_url: logo!("monthly_2021_09/gdt-logos-wpg.png.ba967dfc0e637107ef9c46436cc6d7c7.png"), aliases: &["peg"] },
    // Pacific
    TeamIdentity { code: "ANA", name: "Anaheim Ducks", city: "Anaheim", nickname: "Ducks", slug: "anaheim-ducks", logo_url: logo!("monthly_2024_10/ANA.png.e205426d6dd0c0e62a8ca45f4285a848.png"), aliases: &[] },
    TeamIdentity { code: "CGY", name: "Calgary Flames", city: "Calgary", nickname: "Flames", slug: "calgary-flames", logo_url: logo!("monthly_2021_09/gdt-logos-cgy.png.a6a381a09391cff7eaf233cfe8eccbe8.png"), aliases: &["cal"] },
    TeamIdentity { code: "EDM", name: "Edmonton Oilers", city: "Edmonton", nickname: "Oilers", slug: "edmonton-oilers", logo_url: logo!("monthly_2021_09/gdt-logos-edm.png.7bb6a5835c8fab1e96eacd930be2b112.png"), aliases: &["oil", "oilers"] },
    TeamIdentity { code: "LAK", name: "Los Angeles Kings", city: "Los Angeles", nickname: "Kings", slug: "los-angeles-kings", logo_url: logo!("monthly_2025_03/gdt-logos-lak.png.94aa50efd13cf820f39951f595ff2fff.png"), aliases: &["la", "la kings", "l.a."] },
    TeamIdentity { code: "SJS", name: "San Jose Sharks", city: "San Jose", nickname: "Sharks", slug: "san-jose-sharks", logo_url: logo!("monthly_2021_09/gdt-logos-sjs.png.5aec12c85fc975e9b51615fbb48eafef.png"), aliases: &["sj"] },
    TeamIdentity { code: "SEA", name: "Seattle Kraken", city: "Seattle", nickname: "Kraken", slug: "seattle-kraken", logo_url: logo!("monthly_2021_09/gdt-logos-sea.png.e0dc5b9394fafc197ac47c346d4d271a.png"), aliases: &[] },
    TeamIdentity { code: "VAN", name: "Vancouver Canucks", city: "Vancouver", nickname: "Canucks", slug: "vancouver-canucks", logo_url: logo!("monthly_2021_09/gdt-logos-van.png.193f6d61e70c3faa37823d822d085b19.png"), aliases: &["nucks"] },
    TeamIdentity { code: "VGK", name: "Vegas Golden Knights", city: "Vegas", nickname: "Golden Knights", slug: "vegas-golden-knights", logo_url: logo!("monthly_2021_09/gdt-logos-vgk.png.6e5a8a5dcfe130477f1ed83a60e445fd.png"), aliases: &["knights", "las vegas", "vgk"] },
];

/// Lowercase, drop periods, collapse whitespace.
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

static LOOKUP: Lazy<HashMap<String, &'static TeamIdentity>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for team in TEAMS {
        let keys = [team.code, team.name, team.nickname]
            .into_iter()
            .chain(team.aliases.iter().copied());
        for key in keys {
            map.insert(normalize(key), team);
        }
    }
    // Cities are only unambiguous when a single franchise plays there
    for team in TEAMS {
        let city = normalize(team.city);
        let shared = TEAMS.iter().filter(|t| normalize(t.city) == city).count() > 1;
        if !shared {
            map.entry(city).or_insert(team);
        }
    }
    map
});

/// Resolve free-form user input to a franchise.
///
/// Accepts full names, cities, nicknames, codes and common short forms in any case.
/// Never touches the network.
pub fn resolve(input: &str) -> Result<&'static TeamIdentity, GdtError> {
    let key = normalize(input);
    if let Some(team) = LOOKUP.get(&key) {
        return Ok(*team);
    }
    Err(GdtError::UnknownTeam {
        input: input.trim().to_string(),
        suggestion: suggest(&key),
    })
}

pub fn find_by_code(code: &str) -> Option<&'static TeamIdentity> {
    TEAMS.iter().find(|t| t.code.eq_ignore_ascii_case(code.trim()))
}

/// Closest team name for a typo, if anything scores well enough.
fn suggest(key: &str) -> Option<String> {
    if key.len() < 3 {
        return None;
    }
    let matcher = SkimMatcherV2::default();
    LOOKUP
        .iter()
        .filter_map(|(alias, team)| {
            matcher
                .fuzzy_match(alias, key)
                .map(|score| (score, team.name))
        })
        .filter(|(score, _)| *score >= 40)
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
        .map(|(_, name)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_alias_resolves_to_its_team() {
        for team in TEAMS {
            let mut inputs = vec![
                team.code.to_string(),
                team.code.to_lowercase(),
                team.name.to_string(),
                team.name.to_uppercase(),
                team.nickname.to_string(),
                format!("  {}  ", team.nickname.to_lowercase()),
            ];
            inputs.extend(team.aliases.iter().map(|a| a.to_string()));
            for input in inputs {
                let resolved = resolve(&input).unwrap();
                assert_eq!(resolved.code, team.code, "input {:?}", input);
            }
        }
    }

    #[test]
    fn test_aliases_are_not_shared() {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for team in TEAMS {
            let keys = [team.code, team.name, team.nickname]
                .into_iter()
                .chain(team.aliases.iter().copied());
            for key in keys {
                if let Some(other) = seen.insert(normalize(key), team.code) {
                    assert_eq!(other, team.code, "alias {:?} is claimed twice", key);
                }
            }
        }
    }

    #[test]
    fn test_cities() {
        assert_eq!(resolve("Buffalo").unwrap().code, "BUF");
        assert_eq!(resolve("st louis").unwrap().code, "STL");
        assert_eq!(resolve("St. Louis Blues").unwrap().code, "STL");
        assert_eq!(resolve("tampa bay").unwrap().code, "TBL");
        // Shared city stays ambiguous
        assert!(resolve("New York").is_err());
    }

    #[test]
    fn test_spec_examples() {
        assert_eq!(resolve("Devils").unwrap().code, "NJD");
        assert_eq!(resolve("NJD").unwrap().code, "NJD");
        assert_eq!(resolve("Sabres").unwrap().code, "BUF");
        assert_eq!(resolve("golden   knights").unwrap().code, "VGK");
    }

    #[test]
    fn test_unknown_team() {
        match resolve("Xyz") {
            Err(GdtError::UnknownTeam { input, .. }) => assert_eq!(input, "Xyz"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(resolve("").is_err());
    }

    #[test]
    fn test_typo_gets_suggestion() {
        match resolve("Rangrs") {
            Err(GdtError::UnknownTeam { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("New York Rangers"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_find_by_code() {
        assert_eq!(find_by_code("nyr").unwrap().name, "New York Rangers");
        assert!(find_by_code("XXX").is_none());
    }

    #[test]
    fn test_full_name_matching() {
        let uta = find_by_code("UTA").unwrap();
        assert!(uta.matches_full_name("Utah Mammoth"));
        assert!(uta.matches_full_name("Utah Hockey Club"));
        let stl = find_by_code("STL").unwrap();
        assert!(stl.matches_full_name("St Louis Blues"));
        assert!(!stl.matches_full_name("Boston Bruins"));
    }

    #[test]
    fn test_logos_point_at_media_host() {
        for team in TEAMS.iter().filter(|t| !t.logo_url.is_empty()) {
            assert!(
                team.logo_url.starts_with("//media.invisioncic.com/c316106/"),
                "{}",
                team.code
            );
        }
    }
}

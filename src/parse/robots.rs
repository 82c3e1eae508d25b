//! `robots.txt` groups.
//!
//! Consecutive `User-agent` lines open a group that shares the rules
//! following them. `Sitemap` lines are global. Comments after `#` are
//! dropped; unknown directives are ignored.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub agents: Vec<String>,
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
    pub line: usize,
}

impl Group {
    pub fn names(&self, agent: &str) -> bool {
        self.agents.iter().any(|a| a.eq_ignore_ascii_case(agent))
    }

    /// `Disallow: /` without a compensating `Allow: /`. An empty
    /// `Disallow:` allows everything.
    pub fn blocks_root(&self) -> bool {
        self.disallow.iter().any(|d| d == "/") && !self.allow.iter().any(|a| a == "/")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsTxt {
    pub groups: Vec<Group>,
    pub sitemaps: Vec<(String, usize)>,
}

impl RobotsTxt {
    /// The group naming `agent` explicitly, if any.
    pub fn group_for(&self, agent: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.names(agent))
    }

    pub fn wildcard(&self) -> Option<&Group> {
        self.group_for("*")
    }
}

pub fn parse(source: &str) -> RobotsTxt {
    let mut out = RobotsTxt::default();
    let mut current: Option<Group> = None;
    // A rule line closes the agent list; the next User-agent starts a new group.
    let mut in_rules = false;

    for (i, raw) in source.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        match key.as_str() {
            "user-agent" => {
                if in_rules || current.is_none() {
                    if let Some(g) = current.take() {
                        out.groups.push(g);
                    }
                    current = Some(Group {
                        line: i + 1,
                        ..Group::default()
                    });
                    in_rules = false;
                }
                if let Some(g) = current.as_mut() {
                    g.agents.push(value);
                }
            }
            "allow" | "disallow" => {
                in_rules = true;
                if let Some(g) = current.as_mut() {
                    if key == "allow" {
                        g.allow.push(value);
                    } else {
                        g.disallow.push(value);
                    }
                }
            }
            "sitemap" => out.sitemaps.push((value, i + 1)),
            _ => {}
        }
    }
    if let Some(g) = current {
        out.groups.push(g);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOTS: &str = "\
# AI crawlers
User-agent: GPTBot
User-agent: ClaudeBot
Disallow: /

User-agent: *
Disallow:   # everything allowed
Allow: /

Sitemap: https://acme.test/sitemap.xml
";

    #[test]
    fn shared_agent_lines_form_one_group() {
        let r = parse(ROBOTS);
        assert_eq!(r.groups.len(), 2);
        assert_eq!(r.groups[0].line, 2);
        assert!(r.group_for("claudebot").is_some_and(Group::blocks_root));
        assert!(r.group_for("CCBot").is_none());
        assert_eq!(r.sitemaps[0].1, 10);
    }

    #[test]
    fn empty_disallow_allows() {
        let r = parse(ROBOTS);
        let w = r.wildcard().unwrap();
        assert_eq!(w.disallow, vec![String::new()]);
        assert!(!w.blocks_root());
    }

    #[test]
    fn rules_before_any_agent_are_ignored() {
        let r = parse("Disallow: /\nUser-agent: *\nAllow: /\n");
        assert_eq!(r.groups.len(), 1);
        assert!(r.groups[0].disallow.is_empty());
    }
}

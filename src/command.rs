//! Use-case commands accepted by the [`RequestHandler`](crate::RequestHandler).

use crate::config::ValidationRules;
use crate::record::{FieldValue, Fields, RecordId};
use crate::request::Role;
use crate::secret::Secret;
use crate::validation::{Rule, Validator};

/// One request from a use case.
///
/// Commands own their input; the handler validates it, checks it against
/// the store and turns it into a single store mutation.
#[derive(Debug)]
pub enum Command {
    /// A guest signs up as a tourist
    RegisterTourist {
        /// First name
        name: String,
        /// Last name
        surname: String,
        /// Login email, unique among tourists
        email: String,
        /// Clear-text password, stored only as a digest
        password: Secret<String>,
    },
    /// A tourist votes and comments on a site, once per site
    SubmitFeedback {
        /// Reviewing tourist
        tourist_id: String,
        /// Reviewed site
        site_id: String,
        /// Vote within the configured range
        vote: i64,
        /// Optional free-text comment
        comment: String,
    },
    /// A tourist bookmarks a site
    AddPreferredSite {
        /// Owning tourist
        tourist_id: String,
        /// Bookmarked site
        site_id: String,
    },
    /// A tourist removes a bookmark
    RemovePreferredSite {
        /// Owning tourist
        tourist_id: String,
        /// Bookmarked site
        site_id: String,
    },
    /// An agency operator adds a refreshment point
    InsertRefreshmentPoint {
        /// Display name
        name: String,
    },
    /// An agency operator attaches a banner to a refreshment point
    InsertBanner {
        /// Refreshment point showing the banner
        refreshment_point_id: RecordId,
        /// Image file name
        image: String,
    },
    /// An agency operator replaces a banner image
    ChangeBannerImage {
        /// Banner to change
        banner_id: RecordId,
        /// New image file name
        image: String,
    },
    /// An agency operator removes a banner
    DeleteBanner {
        /// Banner to remove
        banner_id: RecordId,
    },
    /// An administrator publishes a news item
    InsertNews {
        /// Headline
        title: String,
        /// Text
        body: String,
    },
    /// An administrator withdraws a news item
    DeleteNews {
        /// News item to remove
        news_id: RecordId,
    },
}

impl Command {
    /// Returns the stable snake_case operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::RegisterTourist { .. } => "register_tourist",
            Command::SubmitFeedback { .. } => "submit_feedback",
            Command::AddPreferredSite { .. } => "add_preferred_site",
            Command::RemovePreferredSite { .. } => "remove_preferred_site",
            Command::InsertRefreshmentPoint { .. } => "insert_refreshment_point",
            Command::InsertBanner { .. } => "insert_banner",
            Command::ChangeBannerImage { .. } => "change_banner_image",
            Command::DeleteBanner { .. } => "delete_banner",
            Command::InsertNews { .. } => "insert_news",
            Command::DeleteNews { .. } => "delete_news",
        }
    }

    /// Returns the role the acting principal must hold, `None` for guest commands.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Command::RegisterTourist { .. } => None,
            Command::SubmitFeedback { .. }
            | Command::AddPreferredSite { .. }
            | Command::RemovePreferredSite { .. } => Some(Role::Tourist),
            Command::InsertRefreshmentPoint { .. }
            | Command::InsertBanner { .. }
            | Command::ChangeBannerImage { .. }
            | Command::DeleteBanner { .. } => Some(Role::AgencyOperator),
            Command::InsertNews { .. } | Command::DeleteNews { .. } => Some(Role::Administrator),
        }
    }

    /// Returns the account the command acts on behalf of, if ownership applies.
    pub fn owner(&self) -> Option<&str> {
        match self {
            Command::SubmitFeedback { tourist_id, .. }
            | Command::AddPreferredSite { tourist_id, .. }
            | Command::RemovePreferredSite { tourist_id, .. } => Some(tourist_id.trim()),
            _ => None,
        }
    }

    /// Returns `true` for commands that change or remove existing records.
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            Command::RemovePreferredSite { .. }
                | Command::ChangeBannerImage { .. }
                | Command::DeleteBanner { .. }
                | Command::DeleteNews { .. }
        )
    }

    /// Returns the raw input fields checked by [`validator`](Self::validator).
    pub fn payload(&self) -> Fields {
        let mut fields = Fields::new();
        let mut put = |name: &str, value: FieldValue| {
            fields.insert(name.to_string(), value);
        };
        match self {
            Command::RegisterTourist {
                name,
                surname,
                email,
                password,
            } => {
                put("name", name.as_str().into());
                put("surname", surname.as_str().into());
                put("email", email.as_str().into());
                put("password", password.expose_secret().as_str().into());
            }
            Command::SubmitFeedback {
                tourist_id,
                site_id,
                vote,
                comment,
            } => {
                put("tourist_id", tourist_id.as_str().into());
                put("site_id", site_id.as_str().into());
                put("vote", (*vote).into());
                put("comment", comment.as_str().into());
            }
            Command::AddPreferredSite {
                tourist_id,
                site_id,
            }
            | Command::RemovePreferredSite {
                tourist_id,
                site_id,
            } => {
                put("tourist_id", tourist_id.as_str().into());
                put("site_id", site_id.as_str().into());
            }
            Command::InsertRefreshmentPoint { name } => put("name", name.as_str().into()),
            Command::InsertBanner {
                refreshment_point_id,
                image,
            } => {
                put("refreshment_point_id", (*refreshment_point_id).into());
                put("image", image.as_str().into());
            }
            Command::ChangeBannerImage { banner_id, image } => {
                put("banner_id", (*banner_id).into());
                put("image", image.as_str().into());
            }
            Command::DeleteBanner { banner_id } => put("banner_id", (*banner_id).into()),
            Command::InsertNews { title, body } => {
                put("title", title.as_str().into());
                put("body", body.as_str().into());
            }
            Command::DeleteNews { news_id } => put("news_id", (*news_id).into()),
        }
        fields
    }

    /// Builds the validator for this command under `rules`.
    pub fn validator(&self, rules: &ValidationRules) -> Validator {
        let text = |v: Validator, field: &str, max: usize| {
            v.rule(field, Rule::Required)
                .rule(field, Rule::Printable)
                .rule(field, Rule::MaxLength(max))
        };
        let v = Validator::new();
        match self {
            Command::RegisterTourist { .. } => {
                let v = text(v, "name", rules.name_max_len);
                text(v, "surname", rules.name_max_len)
                    .rule("email", Rule::Required)
                    .rule("email", Rule::Email)
                    .rule("password", Rule::Required)
                    .rule("password", Rule::MinLength(rules.password_min_len))
            }
            Command::SubmitFeedback { .. } => v
                .rule("tourist_id", Rule::Required)
                .rule("site_id", Rule::Required)
                .rule("vote", Rule::Required)
                .rule(
                    "vote",
                    Rule::Range {
                        min: rules.vote_min,
                        max: rules.vote_max,
                    },
                )
                .rule("comment", Rule::Printable)
                .rule("comment", Rule::MaxLength(rules.comment_max_len)),
            Command::AddPreferredSite { .. } | Command::RemovePreferredSite { .. } => v
                .rule("tourist_id", Rule::Required)
                .rule("site_id", Rule::Required),
            Command::InsertRefreshmentPoint { .. } => text(v, "name", rules.name_max_len),
            Command::InsertBanner { .. } | Command::ChangeBannerImage { .. } => v
                .rule("image", Rule::Required)
                .rule("image", Rule::extensions(&rules.image_extensions)),
            Command::InsertNews { .. } => {
                text(v, "title", rules.title_max_len).rule("body", Rule::Required)
            }
            Command::DeleteBanner { .. } | Command::DeleteNews { .. } => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(vote: i64, comment: &str) -> Command {
        Command::SubmitFeedback {
            tourist_id: "t1".into(),
            site_id: "s1".into(),
            vote,
            comment: comment.into(),
        }
    }

    #[test]
    fn feedback_vote_range_follows_rules() {
        let rules = ValidationRules::default();

        for (vote, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let cmd = feedback(vote, "Great");
            let result = cmd.validator(&rules).validate(&cmd.payload());
            assert_eq!(result.is_valid(), ok, "vote {vote}");
        }
    }

    #[test]
    fn feedback_comment_is_optional_but_bounded() {
        let rules = ValidationRules::default();

        let empty = feedback(4, "");
        assert!(empty.validator(&rules).validate(&empty.payload()).is_valid());

        let long = feedback(4, &"x".repeat(rules.comment_max_len + 1));
        let result = long.validator(&rules).validate(&long.payload());
        assert!(result.mentions("comment"));
    }

    #[test]
    fn registration_reports_every_problem() {
        let cmd = Command::RegisterTourist {
            name: " ".into(),
            surname: "Lovelace".into(),
            email: "ada-at-example".into(),
            password: Secret::new("short".into()),
        };

        let result = cmd
            .validator(&ValidationRules::default())
            .validate(&cmd.payload());

        assert_eq!(result.errors().len(), 3);
        assert!(result.mentions("name"));
        assert!(result.mentions("email"));
        assert!(result.mentions("password"));
    }

    #[test]
    fn banner_image_uses_configured_extensions() {
        let rules = ValidationRules {
            image_extensions: vec!["webp".into()],
            ..ValidationRules::default()
        };
        let cmd = Command::InsertBanner {
            refreshment_point_id: RecordId::generate(),
            image: "photo.png".into(),
        };

        assert!(cmd.validator(&rules).validate(&cmd.payload()).mentions("image"));
    }

    #[test]
    fn payload_debug_never_shows_password() {
        let cmd = Command::RegisterTourist {
            name: "Ada".into(),
            surname: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: Secret::new("hunter2222".into()),
        };

        assert!(!format!("{:?}", cmd).contains("hunter2222"));
    }

    #[test]
    fn roles_and_confirmation_per_command() {
        let delete = Command::DeleteNews {
            news_id: RecordId::generate(),
        };
        assert_eq!(delete.required_role(), Some(Role::Administrator));
        assert!(delete.needs_confirmation());
        assert_eq!(delete.owner(), None);

        let fb = feedback(3, "");
        assert_eq!(fb.required_role(), Some(Role::Tourist));
        assert_eq!(fb.owner(), Some("t1"));
        assert!(!fb.needs_confirmation());
    }
}

pub const EMAIL_SUBJECT: &str = "Your Burnout Score Results";

/// Results are only mailed for scores strictly above this.
pub const NOTIFY_ABOVE: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEmail {
    pub subject: String,
    pub body: String,
}

pub fn should_notify(score: f64, opted_in: bool) -> bool {
    opted_in && score > NOTIFY_ABOVE
}

pub fn result_email(score: f64, recommendations: &[&str], public_url: Option<&str>) -> ResultEmail {
    let mut body = format!(
        "Your Burnout Score: {score:.1}\n\nRecommendations:\n{}\n",
        recommendations.join("\n")
    );
    if let Some(url) = public_url {
        body.push_str(&format!("\nTrack your progress at {url}\n"));
    }
    ResultEmail {
        subject: EMAIL_SUBJECT.to_string(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_opted_in_scores_above_seventy_qualify() {
        assert!(should_notify(70.1, true));
        assert!(!should_notify(70.0, true));
        assert!(!should_notify(95.0, false));
        assert!(!should_notify(10.0, true));
    }

    #[test]
    fn body_lists_score_and_recommendations() {
        let email = result_email(82.345, &["Rest more.", "Walk daily."], None);
        assert_eq!(email.subject, "Your Burnout Score Results");
        assert_eq!(
            email.body,
            "Your Burnout Score: 82.3\n\nRecommendations:\nRest more.\nWalk daily.\n"
        );
    }

    #[test]
    fn body_links_back_when_a_public_url_is_known() {
        let email = result_email(90.0, &["Rest more."], Some("https://burnmeter.example"));
        assert!(email.body.ends_with("Track your progress at https://burnmeter.example\n"));
    }
}

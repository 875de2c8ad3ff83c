//! The fixed set of stress domains a student can pick during intake.
//!
//! Data-only: built once at startup, shared read-only across all sessions.

/// One selectable stress domain with its scripted follow-up questions and
/// the campus resource the plan should point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainDefinition {
    /// Short identifier the user types during selection ("1".."5")
    pub id: &'static str,
    /// Human label shown in the selection prompt and the final plan
    pub display_name: &'static str,
    /// Ordered follow-up questions, asked one per turn
    pub questions: &'static [&'static str],
    /// Support resource referenced by generated and fallback plans
    pub resource: &'static str,
}

/// Read-only lookup of every domain, in selection order.
#[derive(Debug)]
pub struct DomainCatalog {
    domains: Vec<DomainDefinition>,
    selection_prompt: String,
}

impl DomainCatalog {
    /// Build the built-in five-domain catalog.
    pub fn builtin() -> Self {
        Self::from_domains(BUILTIN_DOMAINS.to_vec())
    }

    fn from_domains(domains: Vec<DomainDefinition>) -> Self {
        debug_assert!(domains.iter().all(|d| !d.questions.is_empty()));
        let mut selection_prompt = String::from(
            "Which area has been most challenging for you recently? Please choose one:",
        );
        for domain in &domains {
            selection_prompt.push_str(&format!("\n[{}] {}", domain.id, domain.display_name));
        }
        Self {
            domains,
            selection_prompt,
        }
    }

    /// Look up a domain by its id. Exact string match, no numeric coercion.
    pub fn get(&self, id: &str) -> Option<&DomainDefinition> {
        self.domains.iter().find(|d| d.id == id)
    }

    /// The fixed selection prompt enumerating every domain as `[id] name`.
    pub fn selection_prompt(&self) -> &str {
        &self.selection_prompt
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainDefinition> {
        self.domains.iter()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

const BUILTIN_DOMAINS: &[DomainDefinition] = &[
    DomainDefinition {
        id: "1",
        display_name: "Academics",
        questions: &[
            "What course or subject is proving to be most challenging for you right now?",
            "Are you finding the course material difficult to understand, or is it more about the workload and deadlines?",
            "Do you have any upcoming deadlines, exams, or assignments that are causing extra pressure?",
            "Have you reached out for academic support such as tutoring, office hours, or study groups?",
            "What strategies have you tried so far to manage your academic challenges, and how effective have they been?",
        ],
        resource: "https://admissions.miami.edu/undergraduate/academics/academic-resources/index.html",
    },
    DomainDefinition {
        id: "2",
        display_name: "Mental Wellbeing",
        questions: &[
            "How have you been feeling emotionally over the past few weeks? (For example: anxious, sad, or overwhelmed)",
            "Do you experience frequent episodes of anxiety or depression? If so, how intense are these episodes?",
            "How has your sleep been? Do you find it hard to fall or stay asleep?",
            "Are there any personal or family issues that might be affecting your mental health?",
            "What coping mechanisms or self-care practices have you tried, and have they helped you manage your feelings?",
        ],
        resource: "https://health.miami.edu/counseling.html",
    },
    DomainDefinition {
        id: "3",
        display_name: "Physical Health",
        questions: &[
            "How would you describe your overall physical health and energy levels?",
            "Do you experience any physical discomfort, pain, or fatigue that interferes with your daily activities?",
            "What does your typical sleep schedule look like? Do you get enough rest?",
            "How often do you engage in physical exercise or activities?",
            "What changes do you think might improve your physical well-being (e.g., nutrition, exercise, sleep habits)?",
        ],
        resource: "https://health.miami.edu/herbert-wellness-center",
    },
    DomainDefinition {
        id: "4",
        display_name: "Social Life",
        questions: &[
            "How satisfied are you with your current social interactions and friendships?",
            "Do you feel that you have a supportive social network at UM?",
            "Have you experienced any conflicts or feelings of isolation in your social life recently?",
            "How do your social interactions affect your mood and stress levels?",
            "What would you like to change about your social interactions or support system?",
        ],
        resource: "https://www.miami.edu/studentlife/",
    },
    DomainDefinition {
        id: "5",
        display_name: "Career Tension",
        questions: &[
            "What specific career or job-related concerns have been on your mind lately?",
            "Do you feel overwhelmed by the expectations or responsibilities of your current work or internship?",
            "How clear are you about your future career path, and do you feel prepared for it?",
            "Have you sought career advice or mentorship at UM, and what was your experience?",
            "What additional support or resources do you think could help alleviate your career-related stress?",
        ],
        resource: "https://www.miami.edu/career/",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_five_domains_with_five_questions_each() {
        let catalog = DomainCatalog::builtin();
        assert_eq!(catalog.len(), 5);
        for domain in catalog.iter() {
            assert_eq!(domain.questions.len(), 5, "domain {}", domain.id);
            assert!(!domain.resource.is_empty());
        }
    }

    #[test]
    fn get_matches_ids_exactly() {
        let catalog = DomainCatalog::builtin();
        assert_eq!(catalog.get("3").unwrap().display_name, "Physical Health");
        assert!(catalog.get("9").is_none());
        assert!(catalog.get("").is_none());
        // no numeric coercion
        assert!(catalog.get("03").is_none());
        assert!(catalog.get(" 3").is_none());
    }

    #[test]
    fn get_is_idempotent() {
        let catalog = DomainCatalog::builtin();
        let a = catalog.get("2").unwrap();
        let b = catalog.get("2").unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn selection_prompt_enumerates_every_domain() {
        let catalog = DomainCatalog::builtin();
        let prompt = catalog.selection_prompt();
        assert!(prompt.starts_with("Which area has been most challenging"));
        for domain in catalog.iter() {
            assert!(prompt.contains(&format!("[{}] {}", domain.id, domain.display_name)));
        }
    }
}

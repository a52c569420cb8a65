//! Built-in pillar content: the fallback pillar directory, per-pillar
//! control checklists, and the starter recommendation set.

use crate::{ControlItem, ControlStatus, Level, PillarRecord, Recommendation, RecommendationStatus};

pub const PILLARS_COLLECTION: &str = "pillars";
pub const RECOMMENDATIONS_COLLECTION: &str = "recommendations";
pub const ASSESSMENTS_COLLECTION: &str = "assessments";

/// The fixed five-pillar fallback, substituted whole whenever the pillars
/// collection reads empty. Ids and slugs must stay in lockstep with the
/// dashboard routes; changing either breaks tile navigation.
pub fn default_pillars() -> Vec<PillarRecord> {
    vec![
        PillarRecord {
            id: "security".to_string(),
            name: "Security".to_string(),
            slug: "security".to_string(),
            description: "Protect data, systems, and assets".to_string(),
            icon: "ShieldCheck".to_string(),
            color: "orange".to_string(),
            order: 1,
            score: None,
        },
        PillarRecord {
            id: "reliability".to_string(),
            name: "Reliability".to_string(),
            slug: "reliability".to_string(),
            description: "Ensure workloads perform correctly".to_string(),
            icon: "PanelsTopLeft".to_string(),
            color: "blue".to_string(),
            order: 2,
            score: None,
        },
        PillarRecord {
            id: "performance".to_string(),
            name: "Performance Efficiency".to_string(),
            slug: "performance-efficiency".to_string(),
            description: "Use resources efficiently".to_string(),
            icon: "Gauge".to_string(),
            color: "green".to_string(),
            order: 3,
            score: None,
        },
        PillarRecord {
            id: "cost".to_string(),
            name: "Cost Optimization".to_string(),
            slug: "cost-optimization".to_string(),
            description: "Avoid unnecessary costs".to_string(),
            icon: "PiggyBank".to_string(),
            color: "yellow".to_string(),
            order: 4,
            score: None,
        },
        PillarRecord {
            id: "operations".to_string(),
            name: "Operational Excellence".to_string(),
            slug: "operational-excellence".to_string(),
            description: "Run and monitor effectively".to_string(),
            icon: "Crosshair".to_string(),
            color: "red".to_string(),
            order: 5,
            score: None,
        },
    ]
}

const SECURITY_CONTROLS: &[ControlItem] = &[
    ControlItem {
        id: "sec-1",
        name: "Identity and Access Management",
        description: "Implement least privilege access and strong authentication",
        status: ControlStatus::Compliant,
        icon: "UserCheck",
    },
    ControlItem {
        id: "sec-2",
        name: "Data Protection",
        description: "Encrypt data at rest and in transit",
        status: ControlStatus::Partial,
        icon: "Lock",
    },
    ControlItem {
        id: "sec-3",
        name: "Infrastructure Protection",
        description: "Protect systems from unauthorized access",
        status: ControlStatus::ActionRequired,
        icon: "ShieldCheck",
    },
    ControlItem {
        id: "sec-4",
        name: "Incident Response",
        description: "Prepare for and respond to security events",
        status: ControlStatus::Partial,
        icon: "AlertTriangle",
    },
    ControlItem {
        id: "sec-5",
        name: "Key Management",
        description: "Securely manage cryptographic keys",
        status: ControlStatus::Compliant,
        icon: "Key",
    },
];

const RELIABILITY_CONTROLS: &[ControlItem] = &[
    ControlItem {
        id: "rel-1",
        name: "Fault Tolerance",
        description: "Design for failure with redundancy and graceful degradation",
        status: ControlStatus::Compliant,
        icon: "RefreshCw",
    },
    ControlItem {
        id: "rel-2",
        name: "High Availability",
        description: "Ensure systems are available when needed",
        status: ControlStatus::Compliant,
        icon: "Server",
    },
    ControlItem {
        id: "rel-3",
        name: "Disaster Recovery",
        description: "Prepare for and recover from disasters",
        status: ControlStatus::Partial,
        icon: "AlertCircle",
    },
    ControlItem {
        id: "rel-4",
        name: "Data Backup",
        description: "Implement comprehensive backup strategies",
        status: ControlStatus::Compliant,
        icon: "Database",
    },
    ControlItem {
        id: "rel-5",
        name: "Change Management",
        description: "Manage changes to minimize disruption",
        status: ControlStatus::Partial,
        icon: "RefreshCw",
    },
];

const PERFORMANCE_CONTROLS: &[ControlItem] = &[
    ControlItem {
        id: "perf-1",
        name: "Resource Optimization",
        description: "Right-size resources for optimal performance",
        status: ControlStatus::Partial,
        icon: "Cpu",
    },
    ControlItem {
        id: "perf-2",
        name: "Auto-scaling",
        description: "Scale resources automatically based on demand",
        status: ControlStatus::Compliant,
        icon: "TrendingUp",
    },
    ControlItem {
        id: "perf-3",
        name: "Caching Strategy",
        description: "Implement effective caching at multiple levels",
        status: ControlStatus::ActionRequired,
        icon: "Zap",
    },
    ControlItem {
        id: "perf-4",
        name: "Performance Monitoring",
        description: "Monitor and analyze performance metrics",
        status: ControlStatus::Partial,
        icon: "BarChart3",
    },
    ControlItem {
        id: "perf-5",
        name: "Load Testing",
        description: "Regularly test system under load",
        status: ControlStatus::ActionRequired,
        icon: "Gauge",
    },
];

const COST_CONTROLS: &[ControlItem] = &[
    ControlItem {
        id: "cost-1",
        name: "Reserved Instances",
        description: "Use reserved instances for predictable workloads",
        status: ControlStatus::Compliant,
        icon: "DollarSign",
    },
    ControlItem {
        id: "cost-2",
        name: "Right-sizing",
        description: "Optimize resource sizes for actual usage",
        status: ControlStatus::Partial,
        icon: "Calculator",
    },
    ControlItem {
        id: "cost-3",
        name: "Unused Resources",
        description: "Identify and remove unused resources",
        status: ControlStatus::ActionRequired,
        icon: "TrendingDown",
    },
    ControlItem {
        id: "cost-4",
        name: "Cost Monitoring",
        description: "Track and analyze cloud spending",
        status: ControlStatus::Compliant,
        icon: "BarChart2",
    },
    ControlItem {
        id: "cost-5",
        name: "Budget Alerts",
        description: "Set up alerts for budget thresholds",
        status: ControlStatus::Compliant,
        icon: "PiggyBank",
    },
];

const OPERATIONS_CONTROLS: &[ControlItem] = &[
    ControlItem {
        id: "ops-1",
        name: "Infrastructure as Code",
        description: "Manage infrastructure through version-controlled code",
        status: ControlStatus::Compliant,
        icon: "GitBranch",
    },
    ControlItem {
        id: "ops-2",
        name: "Runbook Documentation",
        description: "Document operational procedures and runbooks",
        status: ControlStatus::Partial,
        icon: "FileText",
    },
    ControlItem {
        id: "ops-3",
        name: "Observability",
        description: "Implement comprehensive logging, metrics, and tracing",
        status: ControlStatus::Partial,
        icon: "Activity",
    },
    ControlItem {
        id: "ops-4",
        name: "Team Organization",
        description: "Define clear ownership and escalation paths",
        status: ControlStatus::Compliant,
        icon: "Users",
    },
    ControlItem {
        id: "ops-5",
        name: "Continuous Improvement",
        description: "Learn from incidents and continuously improve",
        status: ControlStatus::Partial,
        icon: "Crosshair",
    },
];

/// Control checklist for a pillar, addressable by id or route slug.
/// Unknown pillars get an empty checklist.
pub fn controls_for(pillar: &str) -> &'static [ControlItem] {
    match pillar {
        "security" => SECURITY_CONTROLS,
        "reliability" => RELIABILITY_CONTROLS,
        "performance" | "performance-efficiency" => PERFORMANCE_CONTROLS,
        "cost" | "cost-optimization" => COST_CONTROLS,
        "operations" | "operational-excellence" => OPERATIONS_CONTROLS,
        _ => &[],
    }
}

/// Headline compliance score shown on each pillar page.
pub fn compliance_score(pillar: &str) -> Option<u8> {
    match pillar {
        "security" => Some(75),
        "reliability" => Some(96),
        "performance" | "performance-efficiency" => Some(82),
        "cost" | "cost-optimization" => Some(85),
        "operations" | "operational-excellence" => Some(78),
        _ => None,
    }
}

/// Starter recommendations served while the recommendations collection is
/// empty.
pub fn builtin_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            id: "rec-1".to_string(),
            pillar_id: "security".to_string(),
            control_id: "sec-3".to_string(),
            title: "Enable VPC Service Controls".to_string(),
            description: "Implement VPC Service Controls to create a security perimeter around GCP resources.".to_string(),
            priority: Level::High,
            effort: Level::Medium,
            impact: Level::High,
            status: RecommendationStatus::Pending,
        },
        Recommendation {
            id: "rec-2".to_string(),
            pillar_id: "security".to_string(),
            control_id: "sec-2".to_string(),
            title: "Enable Customer-Managed Encryption Keys".to_string(),
            description: "Use CMEK for sensitive data to maintain control over encryption keys.".to_string(),
            priority: Level::Medium,
            effort: Level::Low,
            impact: Level::High,
            status: RecommendationStatus::Pending,
        },
        Recommendation {
            id: "rec-3".to_string(),
            pillar_id: "cost".to_string(),
            control_id: "cost-3".to_string(),
            title: "Remove Unused Persistent Disks".to_string(),
            description: "Identify and delete unattached persistent disks to reduce costs.".to_string(),
            priority: Level::High,
            effort: Level::Low,
            impact: Level::Medium,
            status: RecommendationStatus::Pending,
        },
    ]
}

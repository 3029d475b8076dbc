//! Static instance tables: power factors and workload candidates

use crate::models::{Priority, Workload};

/// Power factor for families missing from [`POWER_FACTORS`]
pub const DEFAULT_POWER_FACTOR: f64 = 0.3;

/// Class used when a workload has no catalog entry
pub const FALLBACK_INSTANCE_CLASS: &str = "t3.medium";

/// Maximum number of candidates resolved per workload/priority pair
pub const MAX_CANDIDATES: usize = 15;

/// Relative power draw per instance family (kW-equivalent)
pub const POWER_FACTORS: &[(&str, f64)] = &[
    // GPU
    ("p5", 2.5),
    ("p4d", 2.2),
    ("p4de", 2.3),
    ("p3", 1.8),
    ("g5", 1.2),
    ("g4dn", 0.8),
    // Inferentia
    ("inf2", 0.4),
    ("inf1", 0.5),
    // Graviton
    ("t4g", 0.15),
    ("m7g", 0.25),
    ("m6g", 0.22),
    ("c7g", 0.23),
    ("r7g", 0.30),
    ("r6g", 0.28),
    // x86
    ("t3", 0.25),
    ("m6i", 0.35),
    ("c6i", 0.33),
    ("r6i", 0.45),
    // Serverless
    ("lambda-arm64", 0.10),
    ("lambda-x86_64", 0.12),
    ("fargate-graviton", 0.20),
    ("fargate-standard", 0.25),
];

/// ARM/Graviton families, favoured by the balanced score
pub const ENERGY_EFFICIENT_FAMILIES: &[&str] = &[
    "t4g",
    "m7g",
    "m6g",
    "c7g",
    "c6g",
    "r7g",
    "r6g",
    "x2gd",
    "i4g",
    "fargate-graviton",
    "lambda-arm64",
];

/// Instance categories per workload, in catalog order
pub const WORKLOAD_CATEGORIES: &[(Workload, &[(&str, &[&str])])] = &[
    (
        Workload::Training,
        &[
            (
                "gpu_high_performance",
                &["p5.48xlarge", "p4d.24xlarge", "p4de.24xlarge"],
            ),
            (
                "gpu_standard",
                &["p3.16xlarge", "p3.8xlarge", "p3.2xlarge", "p3dn.24xlarge"],
            ),
            (
                "gpu_cost_optimized",
                &[
                    "g5.48xlarge",
                    "g5.12xlarge",
                    "g5.2xlarge",
                    "g4dn.12xlarge",
                    "g4dn.xlarge",
                ],
            ),
        ],
    ),
    (
        Workload::Inference,
        &[
            (
                "inferentia",
                &[
                    "inf2.48xlarge",
                    "inf2.24xlarge",
                    "inf2.8xlarge",
                    "inf2.xlarge",
                    "inf1.24xlarge",
                    "inf1.6xlarge",
                    "inf1.2xlarge",
                ],
            ),
            ("gpu_inference", &["g5.xlarge", "g4dn.xlarge"]),
            (
                "cpu_inference",
                &[
                    "c7g.16xlarge",
                    "c7g.8xlarge",
                    "c7g.2xlarge",
                    "c6g.16xlarge",
                    "m6g.8xlarge",
                ],
            ),
        ],
    ),
    (
        Workload::General,
        &[
            (
                "graviton_optimized",
                &[
                    "t4g.micro",
                    "t4g.small",
                    "t4g.medium",
                    "m7g.large",
                    "m7g.xlarge",
                    "m6g.large",
                    "c7g.large",
                ],
            ),
            (
                "standard",
                &[
                    "t3.micro",
                    "t3.small",
                    "t3.medium",
                    "m6i.large",
                    "m6i.xlarge",
                    "c6i.large",
                ],
            ),
        ],
    ),
    (
        Workload::Database,
        &[
            (
                "memory_optimized",
                &["r7g.16xlarge", "r6g.8xlarge", "r6i.8xlarge", "x2gd.8xlarge"],
            ),
            ("storage_optimized", &["i4g.16xlarge", "i3en.12xlarge"]),
        ],
    ),
    (
        Workload::Containers,
        &[
            ("fargate", &["fargate-graviton", "fargate-standard"]),
            ("eks_nodes", &["t4g.medium", "m7g.large", "c7g.large"]),
        ],
    ),
    (
        Workload::Serverless,
        &[("lambda", &["lambda-arm64", "lambda-x86_64"])],
    ),
];

/// Categories consulted, in order, for a workload under a non-balanced
/// priority. Balanced flattens every category of the workload instead.
pub fn priority_categories(workload: Workload, priority: Priority) -> &'static [&'static str] {
    match (priority, workload) {
        (Priority::Carbon, Workload::Training) => &["gpu_cost_optimized", "gpu_standard"],
        (Priority::Carbon, Workload::Inference) => &["inferentia", "cpu_inference"],
        (Priority::Carbon, Workload::General) => &["graviton_optimized"],
        (Priority::Carbon, Workload::Database) => &["memory_optimized"],
        (Priority::Carbon, Workload::Containers) => &["fargate", "eks_nodes"],
        (Priority::Carbon, Workload::Serverless) => &["lambda"],
        (Priority::Performance, Workload::Training) => &["gpu_high_performance", "gpu_standard"],
        (Priority::Performance, Workload::Inference) => &["gpu_inference", "inferentia"],
        (Priority::Performance, Workload::General) => &["standard", "graviton_optimized"],
        (Priority::Performance, Workload::Database) => &["memory_optimized"],
        (Priority::Performance, Workload::Containers) => &["eks_nodes"],
        (Priority::Performance, Workload::Serverless) => &["lambda"],
        (Priority::Balanced, _) => &[],
    }
}

/// Carbon optimization tips per service family
pub const SERVICE_OPTIMIZATIONS: &[(&str, &[&str])] = &[
    (
        "ec2",
        &[
            "Use Graviton instances for 60% better energy efficiency",
            "Enable EC2 Instance Scheduler to stop instances during idle periods",
            "Use Auto Scaling to match capacity to demand",
            "Consider Spot Instances for fault-tolerant workloads",
        ],
    ),
    (
        "lambda",
        &[
            "Use ARM64 architecture for 19% better performance and lower carbon",
            "Optimize memory allocation (carbon scales with allocated memory)",
            "Reduce cold starts with provisioned concurrency only when needed",
        ],
    ),
    (
        "s3",
        &[
            "Use S3 Intelligent-Tiering for automatic cost and carbon optimization",
            "Enable S3 Lifecycle policies to move data to colder storage tiers",
            "Use S3 Glacier for archival data (significantly lower carbon footprint)",
        ],
    ),
    (
        "rds",
        &[
            "Use Graviton-based instances for databases",
            "Enable Aurora Serverless v2 for variable workloads",
            "Use read replicas in low-carbon regions",
            "Schedule automated snapshots during low-carbon intensity periods",
        ],
    ),
];

/// Service family whose tips accompany a workload's recommendations
pub fn service_for(workload: Workload) -> &'static str {
    match workload {
        Workload::Serverless => "lambda",
        Workload::Database => "rds",
        _ => "ec2",
    }
}

use burnwatch_core::{
    CategoricalEncoderRegistry, EncodedFeatureVector, FeatureVectorBuilder, InputRecord,
};

pub(crate) fn sample_record() -> InputRecord {
    InputRecord {
        age: 30,
        gender: "Male".to_string(),
        job_role: "Developer".to_string(),
        monthly_income: 50_000,
        work_hours_per_week: 45,
        overtime: "No".to_string(),
        job_satisfaction: 3,
        work_life_balance: 3,
        years_at_company: 3,
        promotion_gap: 2,
        manager_support: 3,
    }
}

pub(crate) fn strained_record() -> InputRecord {
    InputRecord {
        monthly_income: 25_000,
        work_hours_per_week: 60,
        overtime: "Yes".to_string(),
        job_satisfaction: 1,
        work_life_balance: 1,
        promotion_gap: 5,
        manager_support: 1,
        ..sample_record()
    }
}

pub(crate) fn sample_vector() -> EncodedFeatureVector {
    let encoders = CategoricalEncoderRegistry::fit_declared();
    FeatureVectorBuilder::new(&encoders)
        .build(&sample_record())
        .unwrap()
}

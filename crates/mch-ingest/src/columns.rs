//! Survey column lookup tables.
//!
//! Survey exports name their columns after the question text, and the text
//! drifts between questionnaire versions. The pre-delivery questionnaire is
//! stable and looked up by exact header; the post-delivery questionnaire is
//! looked up by ordered regex patterns: the first pattern that matches any
//! header wins, and within one pattern the leftmost matching column wins.

use std::collections::BTreeMap;

use regex::Regex;

use crate::csv_table::normalize_header;
use crate::error::{IngestError, Result};

/// Header suffix the survey tool appends to "other, please specify" text columns.
pub const FREE_TEXT_SUFFIX: &str = "[选项填空]";

/// How a logical column is located among the export headers.
#[derive(Debug, Clone, Copy)]
pub enum ColumnRule {
    /// Header equals the text after whitespace normalization.
    Exact(&'static str),
    /// First header matching any of the patterns, tried in order.
    Patterns(&'static [&'static str]),
}

/// A logical survey field with a fixed lookup rule.
pub trait SurveyColumn: Copy + Ord + std::fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn rule(self) -> ColumnRule;
}

/// Column indices resolved against one export's headers.
#[derive(Debug, Clone)]
pub struct ColumnLookup<C> {
    indices: BTreeMap<C, usize>,
}

impl<C: SurveyColumn> ColumnLookup<C> {
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let mut indices = BTreeMap::new();
        for &column in C::ALL {
            if let Some(idx) = find_column(headers, column.rule(), column)? {
                indices.insert(column, idx);
            }
        }
        Ok(Self { indices })
    }

    pub fn index(&self, column: C) -> Option<usize> {
        self.indices.get(&column).copied()
    }

    pub fn contains(&self, column: C) -> bool {
        self.indices.contains_key(&column)
    }

    /// Columns with no matching header in this export.
    pub fn missing(&self) -> Vec<C> {
        C::ALL
            .iter()
            .copied()
            .filter(|column| !self.indices.contains_key(column))
            .collect()
    }
}

fn find_column<C: std::fmt::Debug>(
    headers: &[String],
    rule: ColumnRule,
    column: C,
) -> Result<Option<usize>> {
    match rule {
        ColumnRule::Exact(text) => {
            let wanted = normalize_header(text);
            Ok(headers.iter().position(|h| *h == wanted))
        }
        ColumnRule::Patterns(patterns) => {
            for pattern in patterns {
                let rx = Regex::new(pattern).map_err(|source| IngestError::InvalidPattern {
                    field: format!("{column:?}"),
                    source,
                })?;
                if let Some(idx) = headers.iter().position(|h| rx.is_match(h)) {
                    return Ok(Some(idx));
                }
            }
            Ok(None)
        }
    }
}

/// How the columns of a multi-response question are recognised.
#[derive(Debug, Clone, Copy)]
pub enum GroupRule {
    /// Headers starting with the question text.
    Prefix(&'static str),
    /// Headers containing every keyword.
    Keywords(&'static [&'static str]),
}

/// Columns belonging to one multi-response question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseGroup {
    /// One column per tickable option, in export order.
    pub options: Vec<usize>,
    /// The free-text "other" column; the last one wins if several match.
    pub free_text: Option<usize>,
}

impl GroupRule {
    fn matches(self, header: &str) -> bool {
        match self {
            GroupRule::Prefix(prefix) => header.starts_with(&normalize_header(prefix)),
            GroupRule::Keywords(keywords) => keywords.iter().all(|kw| header.contains(kw)),
        }
    }

    pub fn resolve(self, headers: &[String]) -> ResponseGroup {
        let mut group = ResponseGroup::default();
        for (idx, header) in headers.iter().enumerate() {
            if !self.matches(header) {
                continue;
            }
            if header.ends_with(FREE_TEXT_SUFFIX) {
                group.free_text = Some(idx);
            } else {
                group.options.push(idx);
            }
        }
        group
    }
}

/// Pre-delivery questionnaire fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreSurveyColumn {
    JoinedDate,
    Name,
    Contact,
    Age,
    GestationalAge,
    Height,
    Weight,
    PrePregnancyWeight,
    LastMenstrual,
    EstimatedDelivery,
    FirstPregnancy,
    PregnancyCount,
    FirstDelivery,
    ChildrenCount,
    LastDeliveryDate,
    PreviousPreterm,
    SurgeryHistory,
    SmokingHistory,
    StillSmoking,
    QuitSmokingForPregnancy,
    AlcoholHistory,
    StillDrinking,
    QuitDrinkingForPregnancy,
    DrugHistory,
}

impl SurveyColumn for PreSurveyColumn {
    const ALL: &'static [Self] = &[
        Self::JoinedDate,
        Self::Name,
        Self::Contact,
        Self::Age,
        Self::GestationalAge,
        Self::Height,
        Self::Weight,
        Self::PrePregnancyWeight,
        Self::LastMenstrual,
        Self::EstimatedDelivery,
        Self::FirstPregnancy,
        Self::PregnancyCount,
        Self::FirstDelivery,
        Self::ChildrenCount,
        Self::LastDeliveryDate,
        Self::PreviousPreterm,
        Self::SurgeryHistory,
        Self::SmokingHistory,
        Self::StillSmoking,
        Self::QuitSmokingForPregnancy,
        Self::AlcoholHistory,
        Self::StillDrinking,
        Self::QuitDrinkingForPregnancy,
        Self::DrugHistory,
    ];

    fn rule(self) -> ColumnRule {
        ColumnRule::Exact(match self {
            Self::JoinedDate => "开始答题时间",
            Self::Name => "1.名字",
            Self::Contact => "2.电话号码",
            Self::Age => "3.您的年龄是多少？",
            Self::GestationalAge => "4.目前的孕周（例如 38.4 代表38周4天）",
            Self::Height => "5.目前的身高（厘米）",
            Self::Weight => "6.目前的体重（斤）",
            Self::PrePregnancyWeight => "7.怀孕前的体重（斤）",
            Self::LastMenstrual => "8.您的最后一次月经大概是什么时候？",
            Self::EstimatedDelivery => "10.预产期是？",
            Self::FirstPregnancy => "11.这是您第一次怀孕吗？",
            Self::PregnancyCount => "12.  这是您第几次怀孕？（包括现在）",
            Self::FirstDelivery => "13.这是您第一次分娩吗？",
            Self::ChildrenCount => "14.您已经有几个孩子了？",
            Self::LastDeliveryDate => "15.最近一次分娩大概是什么时候？",
            Self::PreviousPreterm => "16.上一次怀孕有出现早产吗？",
            Self::SurgeryHistory => "17.您是否做过剖腹产或子宫相关手术？[选项填空]",
            Self::SmokingHistory => "20.您有抽烟习惯吗？",
            Self::StillSmoking => "21.目前还在抽烟吗？",
            Self::QuitSmokingForPregnancy => "22.是怀孕后才戒的吗？",
            Self::AlcoholHistory => "23.您有饮酒习惯吗？",
            Self::StillDrinking => "24.目前还在饮酒吗？",
            Self::QuitDrinkingForPregnancy => "25.是怀孕后才戒的吗？",
            Self::DrugHistory => "26.您是否有药物或毒品滥用史？",
        })
    }
}

/// Current-symptoms multi-response question (pre-delivery).
pub const PRE_SYMPTOMS_GROUP: GroupRule = GroupRule::Prefix("18.您现在有没有以下不适？");
/// Diagnosed-conditions multi-response question (pre-delivery).
pub const PRE_DIAGNOSED_GROUP: GroupRule =
    GroupRule::Prefix("19.此次怀孕期间，医生是否诊断以下疾病？");

/// Post-delivery questionnaire fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PostSurveyColumn {
    Name,
    Contact,
    Hospitalised,
    DeliveryMethod,
    WaterBreak,
    ContractionDuration,
    BirthroomDuration,
    BirthroomInterval,
    CSectionEntry,
    CSectionReason,
    ActualDeliveryDate,
    DeliveryTime,
    GestationalAge,
    UsageReason,
    ContractionAwareness,
    Influence,
    Usefulness,
    ProblemsFaced,
    ProblemsDescription,
    Recommend,
    WhyRecommend,
    WhyNotRecommend,
    Ultrasound,
    InformedDoctor,
    DoctorReaction,
    Improvement,
}

impl SurveyColumn for PostSurveyColumn {
    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Contact,
        Self::Hospitalised,
        Self::DeliveryMethod,
        Self::WaterBreak,
        Self::ContractionDuration,
        Self::BirthroomDuration,
        Self::BirthroomInterval,
        Self::CSectionEntry,
        Self::CSectionReason,
        Self::ActualDeliveryDate,
        Self::DeliveryTime,
        Self::GestationalAge,
        Self::UsageReason,
        Self::ContractionAwareness,
        Self::Influence,
        Self::Usefulness,
        Self::ProblemsFaced,
        Self::ProblemsDescription,
        Self::Recommend,
        Self::WhyRecommend,
        Self::WhyNotRecommend,
        Self::Ultrasound,
        Self::InformedDoctor,
        Self::DoctorReaction,
        Self::Improvement,
    ];

    fn rule(self) -> ColumnRule {
        ColumnRule::Patterns(match self {
            Self::Name => &["姓名"],
            Self::Contact => &["手机.?号码|联系方式|联系电话"],
            Self::Hospitalised => &["什么时候.*住院|住院.*准备分娩"],
            Self::DeliveryMethod => &["分娩方式"],
            Self::WaterBreak => &["羊水.*(什么.*时候|日期|时间).*破"],
            Self::ContractionDuration => &["从开始.*宫缩.*到.*出生.*持续.*多长.*时间"],
            Self::BirthroomDuration => &["从进入.*产房.*到.*出生.*多长.*时间"],
            Self::BirthroomInterval => &["从.*被告知.*进入.*产程.*到.*转入.*产房.*间隔.*多久"],
            Self::CSectionEntry => &["剖(腹|宫)产.*几点.*进入.*产房"],
            Self::CSectionReason => &["剖(腹|宫)产.*因为什么原因|剖.*产.*原因"],
            Self::ActualDeliveryDate => &["实际.*分娩.*日期"],
            Self::DeliveryTime => &["实际.*分娩.*时间.*几点", "实际.*分娩.*时间"],
            Self::GestationalAge => &["分娩时.*孕周.*第几周.*几天", "孕周.*例如.*38.*周", "孕周"],
            Self::UsageReason => &["使用.*主要.*目的|使用.*目的"],
            Self::ContractionAwareness => &["使用.*期间.*(感受到|察觉).*(宫缩|收缩).*逐渐加剧"],
            Self::Influence => &["(读数|数据).*(是否|有无).*(去医院|生产).*产生.*影响"],
            Self::Usefulness => &["使用.*是否.*有助.*(监测|了解).*宝宝.*健康"],
            Self::ProblemsFaced => &["使用.*是否.*遇到过问题"],
            Self::ProblemsDescription => &["简要描述.*遇到.*问题|问题.*描述"],
            Self::Recommend => &["会.*推荐|是否.*推荐"],
            Self::WhyRecommend => &["为什么.*会.*推荐"],
            Self::WhyNotRecommend => &["为什么.*不会.*推荐"],
            Self::Ultrasound => &["(医院|同时).*(胎儿|胎).*监护|CTG"],
            Self::InformedDoctor => &["是否.*告诉.*医生.*使用.*萌动|是否.*告知.*医生"],
            Self::DoctorReaction => &["(他们|医生).*(什么).*反应|医生.*反应"],
            Self::Improvement => &["认为.*可以.*改进|改进.*地方|改进.*建议"],
        })
    }
}

/// Device advantages multi-response question (post-delivery).
pub const POST_ADVANTAGES_GROUP: GroupRule = GroupRule::Keywords(&["使用", "优点"]);
/// Device disadvantages multi-response question (post-delivery).
pub const POST_DISADVANTAGES_GROUP: GroupRule = GroupRule::Keywords(&["使用", "不足"]);

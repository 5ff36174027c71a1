//! Column vocabulary shared by the linker, matcher and index builder.
//!
//! Source tables arrive with their own headers (inventory headers are numbered,
//! use-submission headers are upper-case). The linker renames the use-submission
//! columns into a unified vocabulary; everything downstream speaks that
//! vocabulary only.

// -----------------------------------------------------------------------------
// Reporting inventory (TRI)
// -----------------------------------------------------------------------------

pub const INV_CAS_NUMBER: &str = "76. CAS NUMBER";
pub const INV_FRS_FACILITY_ID: &str = "74. FRS FACILITY ID";
pub const INV_PRIMARY_NAICS: &str = "41. PRIMARY NAICS CODE";

/// Six declared industry-code slots of the inventory layout.
pub const INV_NAICS_CODES: [&str; 6] = [
    "41. NAICS CODE 1",
    "42. NAICS CODE 2",
    "43. NAICS CODE 3",
    "44. NAICS CODE 4",
    "45. NAICS CODE 5",
    "46. NAICS CODE 6",
];

/// Activity flag columns reported per facility.
pub const INV_REPORTED_ACTIVITIES: [&str; 54] = [
    "89. PRODUCE THE CHEMICAL",
    "90. IMPORT THE CHEMICAL",
    "91. ON-SITE USE OF THE CHEMICAL",
    "92. SALE OR DISTRIBUTION OF THE CHEMICAL",
    "93. AS A BYPRODUCT",
    "94. AS A MANUFACTURED IMPURITY",
    "95. USED AS A REACTANT",
    "96. P101  FEEDSTOCKS",
    "97. P102  RAW MATERIALS",
    "98. P103  INTERMEDIATES",
    "99. P104  INITIATORS",
    "100. P199  OTHER",
    "101. ADDED AS A FORMULATION COMPONENT",
    "102. P201  ADDITIVES",
    "103. P202  DYES",
    "104. P203  REACTION DILUENTS",
    "105. P204  INITIATORS",
    "106. P205  SOLVENTS",
    "107. P206  INHIBITORS",
    "108. P207  EMULSIFIERS",
    "109. P208  SURFACTANTS",
    "110. P209  LUBRICANTS",
    "111. P210  FLAME RETARDANTS",
    "112. P211  RHEOLOGICAL MODIFIERS",
    "113. P299  OTHER",
    "114. USED AS AN ARTICLE COMPONENT",
    "115. REPACKAGING",
    "116. AS A PROCESS IMPURITY",
    "117. PROCESSED / RECYCLING",
    "118. USED AS A CHEMICAL PROCESSING AID",
    "119. Z101  PROCESS SOLVENTS",
    "120. Z102  CATALYSTS",
    "121. Z103  INHIBITORS",
    "122. Z104  INITIATORS",
    "123. Z105  REACTION TERMINATORS",
    "124. Z106  SOLUTION BUFFERS",
    "125. Z199  OTHER",
    "126. USED AS A MANUFACTURING AID",
    "127. Z201  PROCESS LUBRICANTS",
    "128. Z202  METALWORKING FLUIDS",
    "129. Z203  COOLANTS",
    "130. Z204  REFRIGERANTS",
    "131. Z205  HYDRAULIC FLUIDS",
    "132. Z299  OTHER",
    "133. ANCILLARY OR OTHER USE",
    "134. Z301  CLEANER",
    "135. Z302  DEGREASER",
    "136. Z303  LUBRICANT",
    "137. Z304  FUEL",
    "138. Z305  FLAME RETARDANT",
    "139. Z306  WASTE TREATMENT",
    "140. Z307  WATER TREATMENT",
    "141. Z308  CONSTRUCTION MATERIALS",
    "142. Z399  OTHER",
];

// -----------------------------------------------------------------------------
// Use submissions (CDR), raw headers
// -----------------------------------------------------------------------------

pub const USE_CHEMICAL_ID: &str = "CHEMICAL ID";
pub const USE_FACILITY_REGISTRY_ID: &str = "EPA FACILITY REGISTRY ID";

/// Presence of this column marks the industrial processing-and-use set.
pub const RAW_INDUSTRIAL_PROCESS: &str = "INDUSTRIAL TYPE OF PROCESS OR USE OPERATION";
/// Presence of this column marks the consumer/commercial-use set.
pub const RAW_CONSUMER_PRODUCT: &str = "CONSUMER / COMMERCIAL PRODUCT CATEGORY";

const SITE_NAICS_RENAMES: [(&str, &str); 6] = [
    ("SITE NAICS CODE 1", "NAICS Code 1"),
    ("SITE NAICS ACTIVITY 1", "NAICS Activity 1"),
    ("SITE NAICS CODE 2", "NAICS Code 2"),
    ("SITE NAICS ACTIVITY 2", "NAICS Activity 2"),
    ("SITE NAICS CODE 3", "NAICS Code 3"),
    ("SITE NAICS ACTIVITY 3", "NAICS Activity 3"),
];

/// Renames applied when the industrial set is present.
pub fn industrial_renames() -> impl Iterator<Item = (&'static str, &'static str)> {
    [
        ("INDUSTRIAL FUNCTION CATEGORY", INDUSTRIAL_FUNCTION),
        ("IND FUNCT CAT OTHER DESC", INDUSTRIAL_OTHER_FUNCTION),
        (RAW_INDUSTRIAL_PROCESS, INDUSTRIAL_PROCESS),
        ("PHYSICAL FORM(S)", PHYSICAL_FORM),
    ]
    .into_iter()
    .chain(SITE_NAICS_RENAMES)
}

/// Renames applied when the consumer/commercial set is present.
pub fn consumer_renames() -> impl Iterator<Item = (&'static str, &'static str)> {
    [
        ("CONS / COMM FUNCTION CATEGORY", CONSUMER_FUNCTION),
        ("CONS COMM FUNCT CAT OTHER DESC", CONSUMER_OTHER_FUNCTION),
        (RAW_CONSUMER_PRODUCT, CONSUMER_PRODUCT),
        ("PHYSICAL FORM", PHYSICAL_FORM),
    ]
    .into_iter()
    .chain(SITE_NAICS_RENAMES)
}

// -----------------------------------------------------------------------------
// Unified vocabulary (after linking)
// -----------------------------------------------------------------------------

pub const INDUSTRIAL_FUNCTION: &str = "Industrial Function Category";
pub const INDUSTRIAL_OTHER_FUNCTION: &str = "Industrial Other Function Category";
pub const INDUSTRIAL_PROCESS: &str = "Industrial Process or Use Operation";
pub const INDUSTRIAL_OTHER_PROCESS: &str = "INDUSTRIAL OTHER PROCESS OR USE OPERATION";
pub const CONSUMER_FUNCTION: &str = "C/C Function Category";
pub const CONSUMER_OTHER_FUNCTION: &str = "C/C Other Function Category";
pub const CONSUMER_PRODUCT: &str = "C/C Product Category";
pub const CONSUMER_OTHER_PRODUCT: &str = "CONS / COMM PROD CAT OTHER DESC";
pub const PHYSICAL_FORM: &str = "Physical Form";

/// Three declared industry-code slots of the site layout.
pub const SITE_NAICS_CODES: [&str; 3] = ["NAICS Code 1", "NAICS Code 2", "NAICS Code 3"];

pub const ACTIVITY: &str = "ACTIVITY";
pub const RECYCLED: &str = "RECYCLED";

pub const SITES: &str = "INDUSTRIAL SITES";
pub const SITES_CODE: &str = "IND SITES CODE";
pub const WORKERS: &str = "WORKERS";
pub const WORKERS_CODE: &str = "WORKERS CODE";
pub const MAX_CONCENTRATION: &str = "MAXIMUM CONCENTRATION";
pub const MAX_CONCENTRATION_CODE: &str = "MAX CONC CODE";

/// Production-volume and presence columns carried into facility summaries.
pub const VOLUME_COLUMNS: [&str; 13] = [
    "2019 DOMESTIC PV",
    "2019 IMPORT PV",
    "2019 PV",
    "2018 PV",
    "2017 PV",
    "2016 PV",
    "2019 NATIONALLY AGGREGATED PV",
    "2018 NATIONALLY AGGREGATED PV",
    "2017 NATIONALLY AGGREGATED PV",
    "2016 NATIONALLY AGGREGATED PV",
    "IMPORTED CHEM NEVER AT SITE",
    "2019 V USED ON-SITE",
    "2019 V EXPORTED",
];

// -----------------------------------------------------------------------------
// Product composition (ChemExpo) and the PUC → NAICS crosswalk
// -----------------------------------------------------------------------------

pub const PRODUCT_RAW_CAS: &str = "Raw CAS";

pub const PUC_GENERAL: &str = "PUC General Category";
pub const PUC_FAMILY: &str = "PUC Product Family";
pub const PUC_TYPE: &str = "PUC Product Type";

/// Crosswalk headers for the three taxonomy levels, paired with the unified names.
pub const CROSSWALK_LEVELS: [(&str, &str); 3] = [
    ("PUC_level1", PUC_GENERAL),
    ("PUC_level2", PUC_FAMILY),
    ("PUC_level3", PUC_TYPE),
];

pub const CROSSWALK_CODES: [&str; 3] = ["NAICS 1", "NAICS 2", "NAICS 3"];
pub const CROSSWALK_DESCRIPTIONS: [&str; 3] = [
    "NAICS 1 Description",
    "NAICS 2 Description",
    "NAICS 3 Description",
];

pub const DOCUMENT_TITLE: &str = "Data Document Title";
pub const DOCUMENT_SUBTITLE: &str = "Data Document Subtitle";
pub const DOCUMENT_DATE: &str = "Document Date";
pub const PRODUCT_NAME: &str = "Product Name";
pub const PUC_KIND: &str = "PUC Kind";
pub const RAW_MIN_COMP: &str = "Raw Min Comp";
pub const RAW_MAX_COMP: &str = "Raw Max Comp";
pub const RAW_CENTRAL_COMP: &str = "Raw Central Comp";
pub const UNIT_TYPE: &str = "Unit Type";
pub const LOWER_WEIGHT_FRACTION: &str = "Lower Weight Fraction";
pub const UPPER_WEIGHT_FRACTION: &str = "Upper Weight Fraction";
pub const CENTRAL_WEIGHT_FRACTION: &str = "Central Weight Fraction";
pub const WEIGHT_FRACTION_TYPE: &str = "Weight Fraction Type";
pub const COMPONENT: &str = "Component";
pub const PUC_ID: &str = "PUCID";

// -----------------------------------------------------------------------------
// NAICS titles table
// -----------------------------------------------------------------------------

pub const NAICS_TITLE_CODE: &str = "2022 NAICS US   Code";
pub const NAICS_TITLE: &str = "2022 NAICS US Title";

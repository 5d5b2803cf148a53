//! Built-in question bank.
//!
//! Guarantees the app is useful without any external catalog. Extra or
//! replacement compounds can be supplied through the TOML config.

use crate::domain::{Category, CommonError, Compound, Difficulty};

use Category::*;
use Difficulty::*;

fn c(
  id: &str,
  smiles: &str,
  names: &[&str],
  condensed: &str,
  category: Category,
  difficulty: Difficulty,
) -> Compound {
  Compound {
    id: id.into(),
    smiles: smiles.into(),
    names: names.iter().map(|n| n.to_string()).collect(),
    condensed: Some(condensed.into()),
    category,
    difficulty,
    common_errors: Vec::new(),
  }
}

fn with_errors(mut compound: Compound, errors: &[(&str, &str)]) -> Compound {
  compound.common_errors = errors
    .iter()
    .map(|(incorrect, why)| CommonError { incorrect_name: incorrect.to_string(), explanation: why.to_string() })
    .collect();
  compound
}

/// Curated compounds, in the order options are offered to the student.
pub fn seed_compounds() -> Vec<Compound> {
  vec![
    // Straight-chain alkanes
    c("alkane-01", "C", &["methane"], "CH4", Alkane, Easy),
    c("alkane-02", "CC", &["ethane"], "CH3CH3", Alkane, Easy),
    c("alkane-03", "CCC", &["propane"], "CH3CH2CH3", Alkane, Easy),
    c("alkane-04", "CCCC", &["butane"], "CH3CH2CH2CH3", Alkane, Medium),
    c("alkane-05", "CCCCC", &["pentane"], "CH3(CH2)3CH3", Alkane, Medium),
    c("alkane-06", "CCCCCC", &["hexane"], "CH3(CH2)4CH3", Alkane, Medium),
    c("alkane-07", "CCCCCCC", &["heptane"], "CH3(CH2)5CH3", Alkane, Hard),
    c("alkane-08", "CCCCCCCC", &["octane"], "CH3(CH2)6CH3", Alkane, Hard),
    // Branched alkanes
    c("alkane-09", "CC(C)C", &["2-methylpropane", "methylpropane"], "CH3CH(CH3)CH3", Alkane, Easy),
    c("alkane-10", "CC(C)CC", &["2-methylbutane", "methylbutane"], "CH3CH(CH3)CH2CH3", Alkane, Medium),
    with_errors(
      c("alkane-11", "CCC(C)CC", &["3-methylpentane"], "CH3CH2CH(CH3)CH2CH3", Alkane, Medium),
      &[("2-ethylbutane", "The longest chain runs through the ethyl group: it is a pentane with a methyl on carbon 3.")],
    ),
    c("alkane-12", "CC(C)(C)C", &["2,2-dimethylpropane", "dimethylpropane"], "C(CH3)4", Alkane, Medium),
    with_errors(
      c("alkane-13", "CC(C)CCC", &["2-methylpentane"], "CH3CH(CH3)CH2CH2CH3", Alkane, Medium),
      &[("4-methylpentane", "Number the chain from the end nearest the branch so the methyl group gets locant 2, not 4.")],
    ),
    c("alkane-14", "CC(C)C(C)C", &["2,3-dimethylbutane"], "CH3CH(CH3)CH(CH3)CH3", Alkane, Hard),
    c("alkane-15", "CCC(C)(C)CC", &["3,3-dimethylpentane"], "CH3CH2C(CH3)2CH2CH3", Alkane, Hard),
    c("alkane-16", "CC(C)CC(C)C", &["2,4-dimethylpentane"], "CH3CH(CH3)CH2CH(CH3)CH3", Alkane, Hard),
    c("alkane-17", "CCCC(CC)CCC", &["4-ethylheptane"], "CH3CH2CH2CH(CH2CH3)CH2CH2CH3", Alkane, Hard),
    c("alkane-18", "CC(C)(C)CC(C)C", &["2,2,4-trimethylpentane"], "(CH3)3CCH2CH(CH3)CH3", Alkane, Hard),
    // Alkenes
    c("alkene-01", "C=C", &["ethene"], "CH2=CH2", Alkene, Easy),
    c("alkene-02", "CC=C", &["propene", "prop-1-ene"], "CH3CH=CH2", Alkene, Easy),
    with_errors(
      c("alkene-03", "C=CCC", &["but-1-ene", "1-butene"], "CH2=CHCH2CH3", Alkene, Medium),
      &[("but-3-ene", "Number from the end nearest the double bond: it starts at carbon 1, so but-1-ene.")],
    ),
    c("alkene-04", "CC=CC", &["but-2-ene", "2-butene"], "CH3CH=CHCH3", Alkene, Medium),
    c("alkene-05", "C=CCCC", &["pent-1-ene", "1-pentene"], "CH2=CHCH2CH2CH3", Alkene, Medium),
    c("alkene-06", "CC=CCC", &["pent-2-ene", "2-pentene"], "CH3CH=CHCH2CH3", Alkene, Medium),
    c("alkene-07", "CC(C)C=C", &["3-methylbut-1-ene", "3-methyl-1-butene"], "CH3CH(CH3)CH=CH2", Alkene, Medium),
    c("alkene-08", "C=C(C)CC", &["2-methylbut-1-ene", "2-methyl-1-butene"], "CH2=C(CH3)CH2CH3", Alkene, Hard),
    c("alkene-09", "CC=C(C)C", &["2-methylbut-2-ene", "2-methyl-2-butene"], "CH3CH=C(CH3)CH3", Alkene, Hard),
    c("alkene-10", "CCC(C)=CCC", &["3-methylhex-3-ene", "3-methyl-3-hexene"], "CH3CH2C(CH3)=CHCH2CH3", Alkene, Hard),
    // Haloalkanes
    c("halo-01", "CCl", &["chloromethane"], "CH3Cl", Haloalkane, Easy),
    c("halo-02", "CCBr", &["bromoethane"], "CH3CH2Br", Haloalkane, Easy),
    c("halo-03", "CI", &["iodomethane"], "CH3I", Haloalkane, Easy),
    c("halo-04", "CF", &["fluoromethane"], "CH3F", Haloalkane, Easy),
    c("halo-05", "CCCI", &["1-iodopropane"], "CH3CH2CH2I", Haloalkane, Medium),
    c("halo-06", "CC(I)C", &["2-iodopropane"], "CH3CHICH3", Haloalkane, Medium),
    c("halo-07", "CCCCl", &["1-chloropropane"], "CH3CH2CH2Cl", Haloalkane, Medium),
    c("halo-08", "CC(Cl)C", &["2-chloropropane"], "CH3CHClCH3", Haloalkane, Medium),
    c("halo-09", "C(F)(F)F", &["trifluoromethane"], "CHF3", Haloalkane, Medium),
    c("halo-10", "CC(Br)CC", &["2-bromobutane"], "CH3CHBrCH2CH3", Haloalkane, Medium),
    with_errors(
      c("halo-11", "ClCCBr", &["1-bromo-2-chloroethane"], "ClCH2CH2Br", Haloalkane, Hard),
      &[("2-bromo-1-chloroethane", "With a tie in locants, the substituent cited first alphabetically (bromo) gets the lower number.")],
    ),
    c("halo-12", "CC(Cl)(I)C", &["2-chloro-2-iodopropane"], "CH3C(Cl)(I)CH3", Haloalkane, Hard),
    c("halo-13", "FC(Cl)I", &["chlorofluoroiodomethane"], "CHFClI", Haloalkane, Hard),
    // Alkanols
    c("alkanol-01", "CO", &["methanol"], "CH3OH", Alkanol, Easy),
    c("alkanol-02", "CCO", &["ethanol"], "CH3CH2OH", Alkanol, Easy),
    c("alkanol-03", "CCCO", &["propan-1-ol", "1-propanol"], "CH3CH2CH2OH", Alkanol, Medium),
    c("alkanol-04", "CC(O)C", &["propan-2-ol", "2-propanol"], "CH3CH(OH)CH3", Alkanol, Medium),
    c("alkanol-05", "CCCCO", &["butan-1-ol", "1-butanol"], "CH3CH2CH2CH2OH", Alkanol, Medium),
    with_errors(
      c("alkanol-06", "CC(O)CC", &["butan-2-ol", "2-butanol"], "CH3CH(OH)CH2CH3", Alkanol, Medium),
      &[("butan-3-ol", "The hydroxyl group must get the lowest possible locant: count from the other end to get 2.")],
    ),
    c("alkanol-07", "CC(C)(O)C", &["2-methylpropan-2-ol", "2-methyl-2-propanol"], "(CH3)3COH", Alkanol, Hard),
    c("alkanol-08", "CC(C)CO", &["2-methylpropan-1-ol", "2-methyl-1-propanol"], "CH3CH(CH3)CH2OH", Alkanol, Hard),
    c("alkanol-09", "CCC(O)CC", &["pentan-3-ol", "3-pentanol"], "CH3CH2CH(OH)CH2CH3", Alkanol, Hard),
    c("alkanol-10", "CC(O)C(O)C", &["butane-2,3-diol", "2,3-butanediol"], "CH3CH(OH)CH(OH)CH3", Alkanol, Hard),
    // Carboxylic acids
    c("acid-01", "C(=O)O", &["methanoic acid"], "HCOOH", CarboxylicAcid, Easy),
    c("acid-02", "CC(=O)O", &["ethanoic acid"], "CH3COOH", CarboxylicAcid, Easy),
    c("acid-03", "CCC(=O)O", &["propanoic acid"], "CH3CH2COOH", CarboxylicAcid, Medium),
    c("acid-04", "CCCC(=O)O", &["butanoic acid"], "CH3CH2CH2COOH", CarboxylicAcid, Medium),
    c("acid-05", "CC(C)C(=O)O", &["2-methylpropanoic acid", "methylpropanoic acid"], "CH3CH(CH3)COOH", CarboxylicAcid, Medium),
    c("acid-06", "CCCCC(=O)O", &["pentanoic acid"], "CH3CH2CH2CH2COOH", CarboxylicAcid, Hard),
    with_errors(
      c("acid-07", "CC(C)CC(=O)O", &["3-methylbutanoic acid"], "CH3CH(CH3)CH2COOH", CarboxylicAcid, Hard),
      &[("2-methylbutanoic acid", "The carboxyl carbon is always carbon 1, so the methyl sits on carbon 3.")],
    ),
    c("acid-08", "C(C(=O)O)C(=O)O", &["propanedioic acid"], "HOOCCH2COOH", CarboxylicAcid, Hard),
    c("acid-09", "CC(Cl)C(=O)O", &["2-chloropropanoic acid"], "CH3CH(Cl)COOH", CarboxylicAcid, Hard),
    // Mixed: alkanol + alkene
    c("mixed-01", "CC(O)C=C", &["but-3-en-2-ol", "3-buten-2-ol"], "CH2=CHCH(OH)CH3", Mixed, Medium),
    c("mixed-02", "C=CCCO", &["but-3-en-1-ol", "3-buten-1-ol"], "CH2=CHCH2CH2OH", Mixed, Medium),
    c("mixed-03", "CC=CC(O)C", &["pent-3-en-2-ol", "3-penten-2-ol"], "CH3CH=CHCH(OH)CH3", Mixed, Hard),
    c("mixed-04", "C=C(C)CO", &["2-methylprop-2-en-1-ol"], "CH2=C(CH3)CH2OH", Mixed, Hard),
    // Mixed: alkanol + haloalkane
    c("mixed-05", "OCCBr", &["2-bromoethan-1-ol", "2-bromoethanol"], "HOCH2CH2Br", Mixed, Medium),
    c("mixed-06", "ClCC(O)C", &["1-chloropropan-2-ol"], "ClCH2CH(OH)CH3", Mixed, Medium),
    c("mixed-07", "CC(O)CI", &["1-iodopropan-2-ol"], "ICH2CH(OH)CH3", Mixed, Hard),
    c("mixed-08", "C=CC(Br)CO", &["2-bromobut-3-en-1-ol"], "CH2=CHCH(Br)CH2OH", Mixed, Hard),
    // Mixed: alkene + haloalkane
    c("mixed-09", "C=CCl", &["chloroethene"], "CH2=CHCl", Mixed, Easy),
    c("mixed-10", "BrC=C", &["bromoethene"], "CHBr=CH2", Mixed, Easy),
    c("mixed-11", "C=CI", &["iodoethene"], "CH2=CHI", Mixed, Easy),
    c("mixed-12", "ClC=CCl", &["1,2-dichloroethene"], "CHCl=CHCl", Mixed, Medium),
    c("mixed-13", "C=CCBr", &["3-bromoprop-1-ene", "3-bromopropene"], "CH2=CHCH2Br", Mixed, Medium),
    // Mixed: unsaturated acids
    c("mixed-14", "C=CC(=O)O", &["propenoic acid", "prop-2-enoic acid"], "CH2=CHCOOH", Mixed, Medium),
    c("mixed-15", "CC=CC(=O)O", &["but-2-enoic acid"], "CH3CH=CHCOOH", Mixed, Medium),
    c("mixed-16", "C=C(C)C(=O)O", &["2-methylpropenoic acid", "2-methylprop-2-enoic acid"], "CH2=C(CH3)COOH", Mixed, Hard),
    // Mixed: halo acids
    c("mixed-17", "ClCC(=O)O", &["chloroethanoic acid", "2-chloroethanoic acid"], "ClCH2COOH", Mixed, Medium),
    c("mixed-18", "BrCCC(=O)O", &["3-bromopropanoic acid"], "BrCH2CH2COOH", Mixed, Medium),
    c("mixed-19", "CC(I)C(=O)O", &["2-iodopropanoic acid"], "CH3CH(I)COOH", Mixed, Hard),
    c("mixed-20", "ClC(Cl)C(=O)O", &["dichloroethanoic acid", "2,2-dichloroethanoic acid"], "Cl2CHCOOH", Mixed, Hard),
    // Mixed: harder combinations
    c("mixed-21", "ClC=CC(O)C", &["4-chlorobut-3-en-2-ol"], "ClCH=CHCH(OH)CH3", Mixed, Hard),
    c("mixed-22", "CC(Br)=CC(=O)O", &["3-bromobut-2-enoic acid"], "CH3C(Br)=CHCOOH", Mixed, Hard),
    c("mixed-23", "OCC(Cl)C=C", &["2-chlorobut-3-en-1-ol"], "HOCH2CH(Cl)CH=CH2", Mixed, Hard),
    c("mixed-24", "CC(O)C(C)C(=O)O", &["3-hydroxy-2-methylbutanoic acid"], "CH3CH(OH)CH(CH3)COOH", Mixed, Hard),
    c("mixed-25", "C=C(Cl)C(C)(O)C", &["3-chloro-2-methylbut-3-en-2-ol"], "CH2=C(Cl)C(CH3)(OH)CH3", Mixed, Hard),
    c("mixed-26", "CC(O)C=C(Br)C", &["4-bromopent-3-en-2-ol"], "CH3CH(OH)CH=C(Br)CH3", Mixed, Hard),
    c("mixed-27", "CCC(O)C=C", &["pent-1-en-3-ol", "1-penten-3-ol"], "CH3CH2CH(OH)CH=CH2", Mixed, Medium),
    c("mixed-28", "CC(Cl)C(O)CC", &["2-chloropentan-3-ol"], "CH3CH(Cl)CH(OH)CH2CH3", Mixed, Hard),
    c("mixed-29", "C=C(Br)CCC(=O)O", &["4-bromopent-4-enoic acid"], "CH2=C(Br)CH2CH2COOH", Mixed, Hard),
    c("mixed-30", "OCC=CCO", &["but-2-ene-1,4-diol"], "HOCH2CH=CHCH2OH", Mixed, Hard),
    c("mixed-31", "ClCC(Cl)CO", &["2,3-dichloropropan-1-ol"], "ClCH2CH(Cl)CH2OH", Mixed, Hard),
    c("mixed-32", "CC(Cl)=CCC(=O)O", &["4-chloropent-3-enoic acid"], "CH3C(Cl)=CHCH2COOH", Mixed, Hard),
    c("mixed-33", "CC(I)C=C", &["3-iodobut-1-ene"], "CH3CH(I)CH=CH2", Mixed, Hard),
    c("mixed-34", "O=C(O)C=CC(=O)O", &["butenedioic acid", "but-2-enedioic acid"], "HOOCCH=CHCOOH", Mixed, Hard),
  ]
}

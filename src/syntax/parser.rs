//! Recursive-descent grammar over canonical Korean part-of-speech tags.
//!
//! One method per nonterminal. Each method looks at the tag under the cursor, picks
//! the first alternative that can start there and either consumes a contiguous run of
//! tokens or fails at the cursor. A nonterminal that has returned is never re-entered
//! with a different alternative, so a failure always names the exact token that could
//! not be placed.
//!
//! ```text
//! S            := Clause+ SF
//! Clause       := (AdverbPhrase | IC | SP | SE | Role | NounPhrase)* Predicate
//!                 | (Role | NounPhrase | IC ...)+            before SF only
//! Role         := Nominal Particle+
//! Nominal      := NounPhrase | NounClause
//! NounPhrase   := Possessed (JC Possessed)*
//! Possessed    := (NounGroup JKG)* NounGroup
//! NounGroup    := Modifier? MM* XPN? Noun (Noun | XSN)*
//! Modifier     := AdnominalClause
//! Predicate    := VerbGroup (VX-VerbGroup)*
//! VerbGroup    := Stem EP* Ending
//!                 | Nominal (VCP | XSV | XSA) EP* Ending
//! ```
//!
//! A predicate ending in ETM turns the constituents gathered since the last topic into
//! an `AdnominalClause` that modifies the next noun phrase; one ending in ETN turns
//! them into a `NounClause` that takes particles like any noun phrase.

use tracing::trace;

use super::{nt, ParseNode};
use crate::errors::{BlockingToken, ParseFailure};
use crate::normalize::Token;

/// Canonical tag of sentence-final punctuation.
pub const SENTENCE_FINAL: &str = "SF";

/// Deepest embedded clause the parser will build.
pub const MAX_DEPTH: usize = 256;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses one sentence's canonical token sequence.
pub fn parse(tokens: &[Token]) -> Result<ParseNode, ParseFailure> {
    GrammarParser::new(tokens).parse()
}

/// How a predicate's final ending lets the clause continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// EF: closes the sentence's last clause.
    Final,
    /// EC: another clause (or an auxiliary verb) follows.
    Connective,
    /// ETM: the clause modifies the following noun.
    Adnominal,
    /// ETN: the clause acts as a noun.
    Nominalizer,
}

impl Ending {
    pub fn of(tag: &str) -> Option<Self> {
        match tag {
            "EF" => Some(Ending::Final),
            "EC" => Some(Ending::Connective),
            "ETM" => Some(Ending::Adnominal),
            "ETN" => Some(Ending::Nominalizer),
            _ => None,
        }
    }
}

/// Cursor over a token sequence.
pub struct GrammarParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

/// A parsed clause constituent that may still need its continuation resolved.
enum Constituent {
    Done(ParseNode),
    Nominal(ParseNode),
    Predicate(ParseNode, Ending),
}

impl<'a> GrammarParser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Index of the next unconsumed token.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Parses the whole sequence as one sentence; leftover tokens are a failure.
    pub fn parse(mut self) -> Result<ParseNode, ParseFailure> {
        let tree = self.parse_sentence()?;
        if self.pos < self.tokens.len() {
            return Err(self.fail("the end of the sentence"));
        }
        Ok(tree)
    }

    // ========================================================================
    // NONTERMINALS
    // ========================================================================

    fn parse_sentence(&mut self) -> Result<ParseNode, ParseFailure> {
        let mut children = Vec::new();
        loop {
            let (clause, ending) = self.parse_clause()?;
            children.push(clause);
            // A connective ending may also close a sentence in casual speech.
            if ending == Ending::Final || self.at(SENTENCE_FINAL) {
                break;
            }
        }
        children.push(self.expect(|t| t == SENTENCE_FINAL, "sentence-final punctuation")?);
        Ok(ParseNode::branch(nt::SENTENCE, children))
    }

    fn parse_clause(&mut self) -> Result<(ParseNode, Ending), ParseFailure> {
        let mut children = Vec::new();
        loop {
            let Some(tag) = self.peek_tag() else {
                return Err(self.fail("a predicate"));
            };
            let constituent = if is_adverb(tag) {
                Constituent::Done(self.parse_adverb_phrase())
            } else if tag == "IC" || is_pause(tag) {
                Constituent::Done(self.bump())
            } else if starts_nominal(tag) {
                Constituent::Nominal(self.parse_noun_phrase(None)?)
            } else if is_verb_stem(tag) {
                let (predicate, ending) = self.parse_predicate(Vec::new())?;
                Constituent::Predicate(predicate, ending)
            } else if tag == SENTENCE_FINAL && !children.is_empty() {
                // Verbless fragment such as an interjection or a bare noun.
                return Ok((ParseNode::branch(nt::CLAUSE, children), Ending::Final));
            } else {
                return Err(self.fail("a clause constituent"));
            };

            if let Some(done) = self.resolve(constituent, &mut children)? {
                return Ok(done);
            }
        }
    }

    /// Settles a constituent into the clause, returning the finished clause once a
    /// predicate with a final or connective ending is reached.
    fn resolve(
        &mut self,
        mut constituent: Constituent,
        children: &mut Vec<ParseNode>,
    ) -> Result<Option<(ParseNode, Ending)>, ParseFailure> {
        loop {
            constituent = match constituent {
                Constituent::Done(node) => {
                    children.push(node);
                    return Ok(None);
                }
                Constituent::Nominal(nominal) => self.complete_nominal(nominal)?,
                Constituent::Predicate(predicate, Ending::Adnominal) => {
                    let mut parts = take_clause_tail(children);
                    parts.push(predicate);
                    let modifier = self.nest(nt::ADNOMINAL_CLAUSE, parts)?;
                    Constituent::Nominal(self.parse_noun_phrase(Some(modifier))?)
                }
                Constituent::Predicate(predicate, Ending::Nominalizer) => {
                    let mut parts = take_clause_tail(children);
                    parts.push(predicate);
                    Constituent::Nominal(self.nest(nt::NOUN_CLAUSE, parts)?)
                }
                Constituent::Predicate(predicate, ending) => {
                    children.push(predicate);
                    let clause = ParseNode::branch(nt::CLAUSE, std::mem::take(children));
                    return Ok(Some((clause, ending)));
                }
            };
        }
    }

    /// Wraps an embedded clause. Embedding is the only way the tree grows deeper as
    /// the input grows, so the depth is capped here.
    fn nest(&self, tag: &str, parts: Vec<ParseNode>) -> Result<ParseNode, ParseFailure> {
        let depth = 1 + parts.iter().map(ParseNode::depth).max().unwrap_or(0);
        if depth > MAX_DEPTH {
            return Err(self.fail("a less deeply nested clause"));
        }
        Ok(ParseNode::branch(tag, parts))
    }

    /// A nominal followed by particles becomes a role; followed by a copula or a
    /// verb-forming suffix it heads a predicate; otherwise it stands bare.
    fn complete_nominal(&mut self, nominal: ParseNode) -> Result<Constituent, ParseFailure> {
        if let Some(role) = self.peek_tag().and_then(role_of) {
            let mut parts = vec![nominal, self.bump()];
            while self.peek_tag().and_then(role_of).is_some() {
                parts.push(self.bump());
            }
            return Ok(Constituent::Done(ParseNode::branch(role, parts)));
        }
        if self.peek_tag().is_some_and(is_predicating_suffix) {
            let (predicate, ending) = self.parse_predicate(vec![nominal])?;
            return Ok(Constituent::Predicate(predicate, ending));
        }
        Ok(Constituent::Done(nominal))
    }

    /// Possessives and coordinations are built in one pass: `A 의 B 와 C 의 D` becomes
    /// `NounPhrase[NounPhrase[Possessive[A], B], 와, NounPhrase[Possessive[C], D]]`.
    fn parse_noun_phrase(&mut self, modifier: Option<ParseNode>) -> Result<ParseNode, ParseFailure> {
        let mut conjuncts = Vec::new();
        let mut possessors = Vec::new();
        let mut phrase = self.parse_noun_group(modifier)?;

        // One token of extra lookahead: JKG and JC only join noun phrases here when
        // another noun phrase follows them.
        loop {
            match (self.peek_tag(), self.peek_tag_at(1)) {
                (Some("JKG"), Some(next)) if starts_nominal(next) => {
                    possessors.push(ParseNode::branch(nt::POSSESSIVE, vec![phrase, self.bump()]));
                }
                (Some("JC"), Some(next)) if starts_nominal(next) => {
                    conjuncts.push(possessed(std::mem::take(&mut possessors), phrase));
                    conjuncts.push(self.bump());
                }
                _ => break,
            }
            phrase = self.parse_noun_group(None)?;
        }

        let last = possessed(possessors, phrase);
        if conjuncts.is_empty() {
            return Ok(last);
        }
        conjuncts.push(last);
        Ok(ParseNode::branch(nt::NOUN_PHRASE, conjuncts))
    }

    fn parse_noun_group(&mut self, modifier: Option<ParseNode>) -> Result<ParseNode, ParseFailure> {
        let mut children: Vec<ParseNode> = modifier.into_iter().collect();
        while self.at("MM") {
            children.push(self.bump());
        }
        if self.at("XPN") {
            children.push(self.bump());
        }
        children.push(self.expect(is_nominal, "a noun")?);
        while self.peek_tag().is_some_and(|t| is_nominal(t) || t == "XSN") {
            children.push(self.bump());
        }
        Ok(ParseNode::branch(nt::NOUN_PHRASE, children))
    }

    /// `prefix` holds a nominal when the predicate is built on a copula or a
    /// verb-forming suffix. Auxiliaries after a connective ending join the same
    /// `Predicate` as siblings.
    fn parse_predicate(&mut self, prefix: Vec<ParseNode>) -> Result<(ParseNode, Ending), ParseFailure> {
        let (predicate, mut ending) = self.parse_verb_group(prefix)?;
        if ending != Ending::Connective || !self.at("VX") {
            return Ok((predicate, ending));
        }
        let mut chain = vec![predicate];
        while ending == Ending::Connective && self.at("VX") {
            let (auxiliary, next) = self.parse_verb_group(Vec::new())?;
            chain.push(auxiliary);
            ending = next;
        }
        Ok((ParseNode::branch(nt::PREDICATE, chain), ending))
    }

    fn parse_verb_group(&mut self, mut children: Vec<ParseNode>) -> Result<(ParseNode, Ending), ParseFailure> {
        if children.is_empty() {
            children.push(self.expect(is_verb_stem, "a verb or adjective stem")?);
        } else {
            children.push(self.expect(is_predicating_suffix, "a copula or verb-forming suffix")?);
        }
        while self.at("EP") {
            children.push(self.bump());
        }
        let ending = self
            .peek_tag()
            .and_then(Ending::of)
            .ok_or_else(|| self.fail("a verb ending"))?;
        children.push(self.bump());
        Ok((ParseNode::branch(nt::PREDICATE, children), ending))
    }

    fn parse_adverb_phrase(&mut self) -> ParseNode {
        let mut children = vec![self.bump()];
        while self.peek_tag().is_some_and(is_adverb) {
            children.push(self.bump());
        }
        ParseNode::branch(nt::ADVERB_PHRASE, children)
    }

    // ========================================================================
    // CURSOR
    // ========================================================================

    fn peek_tag(&self) -> Option<&'a str> {
        self.peek_tag_at(0)
    }

    fn peek_tag_at(&self, offset: usize) -> Option<&'a str> {
        let tokens: &'a [Token] = self.tokens;
        tokens.get(self.pos + offset).map(|t| t.tag.as_str())
    }

    fn at(&self, tag: &str) -> bool {
        self.peek_tag() == Some(tag)
    }

    /// Consumes the cursor token as a leaf. Callers peek first.
    fn bump(&mut self) -> ParseNode {
        let token = &self.tokens[self.pos];
        self.pos += 1;
        ParseNode::leaf(token.morpheme.as_str(), token.tag.as_str())
    }

    fn expect(&mut self, accepts: impl Fn(&str) -> bool, expected: &str) -> Result<ParseNode, ParseFailure> {
        match self.peek_tag() {
            Some(tag) if accepts(tag) => Ok(self.bump()),
            _ => Err(self.fail(expected)),
        }
    }

    fn fail(&self, expected: &str) -> ParseFailure {
        let token = match self.tokens.get(self.pos) {
            Some(token) => BlockingToken::at(token, self.pos),
            None => BlockingToken::end_of_input(self.pos),
        };
        trace!(position = self.pos, tag = %token.tag, expected, "no alternative matches");
        ParseFailure {
            token,
            expected: expected.to_string(),
        }
    }
}

// ============================================================================
// TAG CLASSES
// ============================================================================

fn is_nominal(tag: &str) -> bool {
    matches!(tag, "NNG" | "NNP" | "NNB" | "NP" | "NR" | "SN" | "SL" | "SH" | "XR")
}

fn starts_nominal(tag: &str) -> bool {
    is_nominal(tag) || matches!(tag, "MM" | "XPN")
}

fn is_verb_stem(tag: &str) -> bool {
    matches!(tag, "VV" | "VA" | "VX" | "VCP" | "VCN")
}

fn is_predicating_suffix(tag: &str) -> bool {
    matches!(tag, "VCP" | "XSV" | "XSA")
}

fn is_adverb(tag: &str) -> bool {
    matches!(tag, "MAG" | "MAJ")
}

fn is_pause(tag: &str) -> bool {
    matches!(tag, "SP" | "SE")
}

/// The phrase a particle marks its noun phrase as.
fn role_of(particle: &str) -> Option<&'static str> {
    match particle {
        "JKS" => Some(nt::SUBJECT),
        "JKO" => Some(nt::OBJECT),
        "JX" => Some(nt::TOPIC),
        "JKC" => Some(nt::COMPLEMENT),
        "JKB" | "JKQ" | "JC" => Some(nt::ADVERBIAL),
        "JKV" => Some(nt::VOCATIVE),
        "JKG" => Some(nt::POSSESSIVE),
        _ => None,
    }
}

/// Closes a possessive chain onto its head noun group.
fn possessed(mut possessors: Vec<ParseNode>, head: ParseNode) -> ParseNode {
    if possessors.is_empty() {
        return head;
    }
    possessors.push(head);
    ParseNode::branch(nt::NOUN_PHRASE, possessors)
}

/// Splits off the constituents an adnominal or nominalized clause absorbs: everything
/// after the last topic, vocative, interjection or pause.
fn take_clause_tail(children: &mut Vec<ParseNode>) -> Vec<ParseNode> {
    let start = children
        .iter()
        .rposition(|c| matches!(c.tag(), nt::TOPIC | nt::VOCATIVE | "IC" | "SP" | "SE"))
        .map_or(0, |i| i + 1);
    children.split_off(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(annotated: &str) -> Vec<Token> {
        annotated
            .split_whitespace()
            .map(|m| {
                let (word, tag) = m.rsplit_once('/').unwrap();
                Token::new(word, tag, word)
            })
            .collect()
    }

    fn pretty(annotated: &str) -> String {
        parse(&tokens(annotated)).unwrap().pretty()
    }

    #[test]
    fn copula_sentence() {
        assert_eq!(
            pretty("나/NP 는/JX 학생/NNG 이/VCP 다/EF ./SF"),
            "(S (Clause (Topic (NounPhrase 나/NP) 는/JX) (Predicate (NounPhrase 학생/NNG) 이/VCP 다/EF)) ./SF)"
        );
    }

    #[test]
    fn auxiliary_chain_groups_predicates() {
        assert_eq!(
            pretty("먹/VV 고/EC 싶/VX 다/EF ./SF"),
            "(S (Clause (Predicate (Predicate 먹/VV 고/EC) (Predicate 싶/VX 다/EF))) ./SF)"
        );
        assert_eq!(
            pretty("먹/VV 어/EC 보/VX 고/EC 싶/VX 다/EF ./SF"),
            "(S (Clause (Predicate (Predicate 먹/VV 어/EC) (Predicate 보/VX 고/EC) \
             (Predicate 싶/VX 다/EF))) ./SF)"
        );
    }

    #[test]
    fn long_auxiliary_chain_stays_flat() {
        let mut input = String::from("먹/VV 어/EC ");
        input.push_str(&"보/VX 고/EC ".repeat(3000));
        input.push_str("싶/VX 다/EF ./SF");
        let tree = parse(&tokens(&input)).unwrap();
        let predicate = &tree.children()[0].children()[0];
        assert_eq!(predicate.children().len(), 3002);
        assert_eq!(tree.depth(), 5);
    }

    #[test]
    fn adnominal_clause_modifies_next_noun() {
        assert_eq!(
            pretty("내/NP 가/JKS 읽/VV 은/ETM 책/NNG 을/JKO 좋아하/VV ㄴ다/EF ./SF"),
            "(S (Clause (Object (NounPhrase (AdnominalClause (Subject (NounPhrase 내/NP) 가/JKS) \
             (Predicate 읽/VV 은/ETM)) 책/NNG) 을/JKO) (Predicate 좋아하/VV ㄴ다/EF)) ./SF)"
        );
    }

    #[test]
    fn adnominal_clause_stops_at_topic() {
        let tree = parse(&tokens("나/NP 는/JX 큰/VA ㄴ/ETM 집/NNG 이/JKS 좋/VA 다/EF ./SF")).unwrap();
        let clause = &tree.children()[0];
        assert_eq!(clause.children()[0].tag(), nt::TOPIC);
        assert_eq!(clause.children()[1].tag(), nt::SUBJECT);
    }

    #[test]
    fn connective_ending_starts_new_clause() {
        let tree = parse(&tokens(
            "비/NNG 가/JKS 오/VV 아서/EC 집/NNG 에/JKB 가/VV 았/EP 다/EF ./SF",
        ))
        .unwrap();
        let tags: Vec<_> = tree.children().iter().map(ParseNode::tag).collect();
        assert_eq!(tags, vec![nt::CLAUSE, nt::CLAUSE, SENTENCE_FINAL]);
        assert_eq!(tree.children()[1].children()[0].tag(), nt::ADVERBIAL);
    }

    #[test]
    fn possessive_and_conjunction() {
        assert_eq!(
            pretty("나/NP 의/JKG 친구/NNG 와/JC 동생/NNG 이/JKS 오/VV 았/EP 다/EF ./SF"),
            "(S (Clause (Subject (NounPhrase (NounPhrase (Possessive (NounPhrase 나/NP) 의/JKG) \
             (NounPhrase 친구/NNG)) 와/JC (NounPhrase 동생/NNG)) 이/JKS) \
             (Predicate 오/VV 았/EP 다/EF)) ./SF)"
        );
    }

    #[test]
    fn possessive_chain_is_flat() {
        assert_eq!(
            pretty("나/NP 의/JKG 친구/NNG 의/JKG 집/NNG 이/JKS 크/VA 다/EF ./SF"),
            "(S (Clause (Subject (NounPhrase (Possessive (NounPhrase 나/NP) 의/JKG) \
             (Possessive (NounPhrase 친구/NNG) 의/JKG) (NounPhrase 집/NNG)) 이/JKS) \
             (Predicate 크/VA 다/EF)) ./SF)"
        );
    }

    #[test]
    fn long_coordination_stays_shallow() {
        let mut input = "사과/NNG 와/JC ".repeat(3000);
        input.push_str("배/NNG 가/JKS 있/VA 다/EF ./SF");
        let tree = parse(&tokens(&input)).unwrap();
        let coordination = &tree.children()[0].children()[0].children()[0];
        assert_eq!(coordination.tag(), nt::NOUN_PHRASE);
        assert_eq!(coordination.children().len(), 6001);
        assert_eq!(tree.depth(), 6);
    }

    #[test]
    fn deeply_embedded_clauses_fail_at_the_cursor() {
        let mut input = "나/NP 가/JKS 읽/VV 은/ETM ".repeat(600);
        input.push_str("책/NNG 이/JKS 좋/VA 다/EF ./SF");
        let toks = tokens(&input);
        let failure = parse(&toks).unwrap_err();
        assert_eq!(failure.expected, "a less deeply nested clause");
        // Each repetition embeds the previous one three levels down.
        assert!(failure.token.position < toks.len() / 2);
        assert_eq!(failure.token.tag, "NP");
        assert_eq!(failure.token.position % 4, 0);
    }

    #[test]
    fn nominalized_clause_takes_particles() {
        let tree = parse(&tokens("책/NNG 을/JKO 읽/VV 기/ETN 가/JKS 좋/VA 다/EF ./SF")).unwrap();
        let subject = &tree.children()[0].children()[0];
        assert_eq!(subject.tag(), nt::SUBJECT);
        assert_eq!(subject.children()[0].tag(), nt::NOUN_CLAUSE);
    }

    #[test]
    fn verbless_fragment() {
        assert_eq!(pretty("네/IC ./SF"), "(S (Clause 네/IC) ./SF)");
    }

    #[test]
    fn leaves_reproduce_tokens() {
        let input = tokens("그리고/MAJ 아주/MAG 빨리/MAG 공부/NNG 하/XSV 었/EP 다/EF ./SF");
        let tree = parse(&input).unwrap();
        let words: Vec<_> = tree.terminals().into_iter().map(|(w, _)| w).collect();
        let expected: Vec<_> = input.iter().map(|t| t.morpheme.as_str()).collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn unknown_tag_blocks_clause() {
        let failure = parse(&tokens("나/NP 는/JX ☆/NA 가/VV 다/EF ./SF")).unwrap_err();
        assert_eq!(failure.token.position, 2);
        assert_eq!(failure.token.tag, "NA");
        assert_eq!(failure.expected, "a clause constituent");
    }

    #[test]
    fn trailing_token_blocks_sentence_end() {
        let failure = parse(&tokens("가/VV 다/EF ☆/NA ./SF")).unwrap_err();
        assert_eq!(failure.token.position, 2);
        assert_eq!(failure.expected, "sentence-final punctuation");
    }

    #[test]
    fn missing_ending_is_reported() {
        let failure = parse(&tokens("가/VV ./SF")).unwrap_err();
        assert_eq!(failure.token.tag, "SF");
        assert_eq!(failure.expected, "a verb ending");
    }

    #[test]
    fn running_out_of_tokens_is_reported() {
        let failure = parse(&tokens("가/VV 다/EF")).unwrap_err();
        assert!(failure.token.is_end_of_input());
        assert_eq!(failure.token.position, 2);
    }

    #[test]
    fn empty_sequence_fails() {
        let failure = parse(&[]).unwrap_err();
        assert!(failure.token.is_end_of_input());
        assert_eq!(failure.expected, "a predicate");
    }
}

use super::term::numeric_literal;
use super::{ParseResult, Parser};
use crate::algebra::{AggregateExpression, Expression, Function};
use crate::lexer::Token;
use crate::term::Sign;

/// How many arguments a built-in function accepts.
#[derive(Clone, Copy)]
enum Arity {
    Exact(usize),
    /// Between the two bounds, both included.
    Range(usize, usize),
    /// Any number, including none.
    Variadic,
}

/// [121] BuiltInCall, without the special forms that have their own expression kind.
static BUILT_IN_FUNCTIONS: &[(&str, Function, Arity)] = &[
    ("STR", Function::Str, Arity::Exact(1)),
    ("LANG", Function::Lang, Arity::Exact(1)),
    ("LANGMATCHES", Function::LangMatches, Arity::Exact(2)),
    ("DATATYPE", Function::Datatype, Arity::Exact(1)),
    ("IRI", Function::Iri, Arity::Exact(1)),
    ("URI", Function::Iri, Arity::Exact(1)),
    ("BNODE", Function::BNode, Arity::Range(0, 1)),
    ("RAND", Function::Rand, Arity::Exact(0)),
    ("ABS", Function::Abs, Arity::Exact(1)),
    ("CEIL", Function::Ceil, Arity::Exact(1)),
    ("FLOOR", Function::Floor, Arity::Exact(1)),
    ("ROUND", Function::Round, Arity::Exact(1)),
    ("CONCAT", Function::Concat, Arity::Variadic),
    ("SUBSTR", Function::SubStr, Arity::Range(2, 3)),
    ("STRLEN", Function::StrLen, Arity::Exact(1)),
    ("REPLACE", Function::Replace, Arity::Range(3, 4)),
    ("UCASE", Function::UCase, Arity::Exact(1)),
    ("LCASE", Function::LCase, Arity::Exact(1)),
    ("ENCODE_FOR_URI", Function::EncodeForUri, Arity::Exact(1)),
    ("CONTAINS", Function::Contains, Arity::Exact(2)),
    ("STRSTARTS", Function::StrStarts, Arity::Exact(2)),
    ("STRENDS", Function::StrEnds, Arity::Exact(2)),
    ("STRBEFORE", Function::StrBefore, Arity::Exact(2)),
    ("STRAFTER", Function::StrAfter, Arity::Exact(2)),
    ("YEAR", Function::Year, Arity::Exact(1)),
    ("MONTH", Function::Month, Arity::Exact(1)),
    ("DAY", Function::Day, Arity::Exact(1)),
    ("HOURS", Function::Hours, Arity::Exact(1)),
    ("MINUTES", Function::Minutes, Arity::Exact(1)),
    ("SECONDS", Function::Seconds, Arity::Exact(1)),
    ("TIMEZONE", Function::Timezone, Arity::Exact(1)),
    ("TZ", Function::Tz, Arity::Exact(1)),
    ("NOW", Function::Now, Arity::Exact(0)),
    ("UUID", Function::Uuid, Arity::Exact(0)),
    ("STRUUID", Function::StrUuid, Arity::Exact(0)),
    ("MD5", Function::Md5, Arity::Exact(1)),
    ("SHA1", Function::Sha1, Arity::Exact(1)),
    ("SHA256", Function::Sha256, Arity::Exact(1)),
    ("SHA384", Function::Sha384, Arity::Exact(1)),
    ("SHA512", Function::Sha512, Arity::Exact(1)),
    ("STRLANG", Function::StrLang, Arity::Exact(2)),
    ("STRDT", Function::StrDt, Arity::Exact(2)),
    ("sameTerm", Function::SameTerm, Arity::Exact(2)),
    ("isIRI", Function::IsIri, Arity::Exact(1)),
    ("isURI", Function::IsIri, Arity::Exact(1)),
    ("isBLANK", Function::IsBlank, Arity::Exact(1)),
    ("isLITERAL", Function::IsLiteral, Arity::Exact(1)),
    ("isNUMERIC", Function::IsNumeric, Arity::Exact(1)),
    ("REGEX", Function::Regex, Arity::Range(2, 3)),
];

/// [127] Aggregate names.
static AGGREGATES: &[&str] = &[
    "COUNT",
    "SUM",
    "MIN",
    "MAX",
    "AVG",
    "SAMPLE",
    "GROUP_CONCAT",
];

impl Parser<'_> {
    /// [110] Expression ::= ConditionalOrExpression
    pub(super) fn expression(&mut self) -> ParseResult<Expression> {
        self.guarded(Self::conditional_or_expression)
    }

    /// [111] ConditionalOrExpression ::= ConditionalAndExpression ( '||' ConditionalAndExpression )*
    fn conditional_or_expression(&mut self) -> ParseResult<Expression> {
        let mut e = self.conditional_and_expression()?;
        while self.cursor.eat_punctuation("||")? {
            let right = self.conditional_and_expression()?;
            e = Expression::Or(Box::new(e), Box::new(right));
        }
        Ok(e)
    }

    /// [112] ConditionalAndExpression ::= ValueLogical ( '&&' ValueLogical )*
    fn conditional_and_expression(&mut self) -> ParseResult<Expression> {
        let mut e = self.relational_expression()?;
        while self.cursor.eat_punctuation("&&")? {
            let right = self.relational_expression()?;
            e = Expression::And(Box::new(e), Box::new(right));
        }
        Ok(e)
    }

    /// [114] RelationalExpression ::= NumericExpression ( '=' NumericExpression | '!=' NumericExpression | '<' NumericExpression | '>' NumericExpression | '<=' NumericExpression | '>=' NumericExpression | 'IN' ExpressionList | 'NOT' 'IN' ExpressionList )?
    fn relational_expression(&mut self) -> ParseResult<Expression> {
        let left = self.additive_expression()?;
        let operator: fn(Box<Expression>, Box<Expression>) -> Expression =
            if self.cursor.eat_punctuation("=")? {
                Expression::Equal
            } else if self.cursor.eat_punctuation("!=")? {
                Expression::NotEqual
            } else if self.cursor.eat_punctuation("<")? {
                Expression::Less
            } else if self.cursor.eat_punctuation(">")? {
                Expression::Greater
            } else if self.cursor.eat_punctuation("<=")? {
                Expression::LessOrEqual
            } else if self.cursor.eat_punctuation(">=")? {
                Expression::GreaterOrEqual
            } else if self.cursor.eat_keyword("IN")? {
                let list = self.expression_list()?;
                return Ok(Expression::In(Box::new(left), list));
            } else if self.cursor.check_keyword("NOT")?
                && self.cursor.peek_nth(1)?.is_keyword("IN")
            {
                self.cursor.next()?;
                self.cursor.next()?;
                let list = self.expression_list()?;
                return Ok(Expression::NotIn(Box::new(left), list));
            } else {
                return Ok(left);
            };
        let right = self.additive_expression()?;
        Ok(operator(Box::new(left), Box::new(right)))
    }

    /// [116] AdditiveExpression ::= MultiplicativeExpression ( '+' MultiplicativeExpression | '-' MultiplicativeExpression | ( NumericLiteralPositive | NumericLiteralNegative ) ( ( '*' UnaryExpression ) | ( '/' UnaryExpression ) )* )*
    ///
    /// A signed literal right after an operand is an addition: `?a -1` is `?a + -1`.
    fn additive_expression(&mut self) -> ParseResult<Expression> {
        let mut e = self.multiplicative_expression()?;
        loop {
            if self.cursor.eat_punctuation("+")? {
                let right = self.multiplicative_expression()?;
                e = Expression::Add(Box::new(e), Box::new(right));
            } else if self.cursor.eat_punctuation("-")? {
                let right = self.multiplicative_expression()?;
                e = Expression::Subtract(Box::new(e), Box::new(right));
            } else if let Some(literal) = numeric_literal(self.cursor.peek()?)
                .filter(|literal| literal.sign() != Sign::Unsigned)
            {
                self.cursor.next()?;
                let right = self.multiplicative_tail(literal.into())?;
                e = Expression::Add(Box::new(e), Box::new(right));
            } else {
                return Ok(e);
            }
        }
    }

    /// [117] MultiplicativeExpression ::= UnaryExpression ( '*' UnaryExpression | '/' UnaryExpression )*
    fn multiplicative_expression(&mut self) -> ParseResult<Expression> {
        let e = self.unary_expression()?;
        self.multiplicative_tail(e)
    }

    fn multiplicative_tail(&mut self, mut e: Expression) -> ParseResult<Expression> {
        loop {
            if self.cursor.eat_punctuation("*")? {
                let right = self.unary_expression()?;
                e = Expression::Multiply(Box::new(e), Box::new(right));
            } else if self.cursor.eat_punctuation("/")? {
                let right = self.unary_expression()?;
                e = Expression::Divide(Box::new(e), Box::new(right));
            } else {
                return Ok(e);
            }
        }
    }

    /// [118] UnaryExpression ::= '!' PrimaryExpression | '+' PrimaryExpression | '-' PrimaryExpression | PrimaryExpression
    fn unary_expression(&mut self) -> ParseResult<Expression> {
        if self.cursor.eat_punctuation("!")? {
            Ok(Expression::Not(Box::new(self.primary_expression()?)))
        } else if self.cursor.eat_punctuation("+")? {
            Ok(Expression::UnaryPlus(Box::new(self.primary_expression()?)))
        } else if self.cursor.eat_punctuation("-")? {
            Ok(Expression::UnaryMinus(Box::new(self.primary_expression()?)))
        } else {
            self.primary_expression()
        }
    }

    /// [119] PrimaryExpression ::= BrackettedExpression | BuiltInCall | iriOrFunction | RDFLiteral | NumericLiteral | BooleanLiteral | Var
    fn primary_expression(&mut self) -> ParseResult<Expression> {
        if self.cursor.check_punctuation("(")? {
            return self.bracketted_expression();
        }
        if let Some(e) = self.try_built_in_call()? {
            return Ok(e);
        }
        if let Some(iri) = self.try_iri()? {
            // [128] iriOrFunction ::= iri ArgList?
            if self.cursor.check_punctuation("(")? {
                let arguments = self.arg_list()?;
                return Ok(Expression::FunctionCall(Function::Custom(iri), arguments));
            }
            return Ok(iri.into());
        }
        if let Some(literal) = self.try_rdf_literal()? {
            return Ok(literal.into());
        }
        if let Some(literal) = self.try_numeric_literal()? {
            return Ok(literal.into());
        }
        if let Some(value) = self.try_boolean_literal()? {
            return Ok(Expression::Boolean(value));
        }
        if let Some(var) = self.try_var()? {
            return Ok(var.into());
        }
        Err(self.cursor.unexpected())
    }

    /// [120] BrackettedExpression ::= '(' Expression ')'
    pub(super) fn bracketted_expression(&mut self) -> ParseResult<Expression> {
        self.cursor.expect_punctuation("(")?;
        let e = self.expression()?;
        self.cursor.expect_punctuation(")")?;
        Ok(e)
    }

    /// [69] Constraint ::= BrackettedExpression | BuiltInCall | FunctionCall
    pub(super) fn constraint(&mut self) -> ParseResult<Expression> {
        if self.cursor.check_punctuation("(")? {
            return self.bracketted_expression();
        }
        if let Some(e) = self.try_built_in_call()? {
            return Ok(e);
        }
        self.function_call()
    }

    /// [70] FunctionCall ::= iri ArgList
    pub(super) fn function_call(&mut self) -> ParseResult<Expression> {
        let iri = self.iri()?;
        let arguments = self.arg_list()?;
        Ok(Expression::FunctionCall(Function::Custom(iri), arguments))
    }

    /// [71] ArgList ::= NIL | '(' 'DISTINCT'? Expression ( ',' Expression )* ')'
    ///
    /// `DISTINCT` only makes sense for custom aggregates, which are not supported.
    pub(super) fn arg_list(&mut self) -> ParseResult<Vec<Expression>> {
        self.expression_list()
    }

    /// [72] ExpressionList ::= NIL | '(' Expression ( ',' Expression )* ')'
    fn expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        self.cursor.expect_punctuation("(")?;
        let mut list = Vec::new();
        if self.cursor.eat_punctuation(")")? {
            return Ok(list);
        }
        loop {
            list.push(self.expression()?);
            if self.cursor.eat_punctuation(")")? {
                return Ok(list);
            }
            self.cursor.expect_punctuation(",")?;
        }
    }

    /// [121] BuiltInCall
    ///
    /// Returns `None` without consuming anything if the current token is not a built-in function name.
    pub(super) fn try_built_in_call(&mut self) -> ParseResult<Option<Expression>> {
        let Token::Keyword(name) = self.cursor.peek()? else {
            return Ok(None);
        };
        if AGGREGATES.iter().any(|a| a.eq_ignore_ascii_case(name)) {
            return self.aggregate().map(Some);
        }
        if name.eq_ignore_ascii_case("BOUND") {
            self.cursor.next()?;
            self.cursor.expect_punctuation("(")?;
            let var = self.var()?;
            self.cursor.expect_punctuation(")")?;
            return Ok(Some(Expression::Bound(var)));
        }
        if name.eq_ignore_ascii_case("IF") {
            self.cursor.next()?;
            self.cursor.expect_punctuation("(")?;
            let condition = self.expression()?;
            self.cursor.expect_punctuation(",")?;
            let then = self.expression()?;
            self.cursor.expect_punctuation(",")?;
            let otherwise = self.expression()?;
            self.cursor.expect_punctuation(")")?;
            return Ok(Some(Expression::If(
                Box::new(condition),
                Box::new(then),
                Box::new(otherwise),
            )));
        }
        if name.eq_ignore_ascii_case("COALESCE") {
            self.cursor.next()?;
            return Ok(Some(Expression::Coalesce(self.expression_list()?)));
        }
        if name.eq_ignore_ascii_case("EXISTS") {
            // [125] ExistsFunc ::= 'EXISTS' GroupGraphPattern
            self.cursor.next()?;
            let pattern = self.group_graph_pattern()?;
            return Ok(Some(Expression::Exists(Box::new(pattern))));
        }
        if name.eq_ignore_ascii_case("NOT") && self.cursor.peek_nth(1)?.is_keyword("EXISTS") {
            // [126] NotExistsFunc ::= 'NOT' 'EXISTS' GroupGraphPattern
            self.cursor.next()?;
            self.cursor.next()?;
            let pattern = self.group_graph_pattern()?;
            return Ok(Some(Expression::NotExists(Box::new(pattern))));
        }
        let Some((_, function, arity)) = BUILT_IN_FUNCTIONS
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        else {
            return Ok(None);
        };
        self.cursor.next()?;
        let arguments = self.built_in_arguments(*arity)?;
        Ok(Some(Expression::FunctionCall(function.clone(), arguments)))
    }

    /// The parenthesized arguments of a built-in function, checked against its arity.
    fn built_in_arguments(&mut self, arity: Arity) -> ParseResult<Vec<Expression>> {
        let (min, max) = match arity {
            Arity::Exact(n) => (n, Some(n)),
            Arity::Range(min, max) => (min, Some(max)),
            Arity::Variadic => (0, None),
        };
        self.cursor.expect_punctuation("(")?;
        let mut arguments = Vec::with_capacity(min);
        if max == Some(0) {
            self.cursor.expect_punctuation(")")?;
            return Ok(arguments);
        }
        if min == 0 && self.cursor.eat_punctuation(")")? {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.expression()?);
            if arguments.len() < min {
                self.cursor.expect_punctuation(",")?;
            } else if max == Some(arguments.len()) {
                self.cursor.expect_punctuation(")")?;
                return Ok(arguments);
            } else if self.cursor.eat_punctuation(")")? {
                return Ok(arguments);
            } else {
                self.cursor.expect_punctuation(",")?;
            }
        }
    }

    /// [127] Aggregate ::= 'COUNT' '(' 'DISTINCT'? ( '*' | Expression ) ')' | 'SUM' '(' 'DISTINCT'? Expression ')' | ... | 'GROUP_CONCAT' '(' 'DISTINCT'? Expression ( ';' 'SEPARATOR' '=' String )? ')'
    ///
    /// `*` is only allowed without `DISTINCT`.
    fn aggregate(&mut self) -> ParseResult<Expression> {
        let token = self.cursor.next()?;
        let Token::Keyword(name) = token.token else {
            return Err(self.cursor.unexpected());
        };
        if !self.aggregates_allowed {
            return Err(Self::semantic_error(
                token.location,
                format!(
                    "The aggregate {} is only allowed in the SELECT, HAVING and ORDER BY clauses",
                    name.to_ascii_uppercase()
                ),
            ));
        }
        self.cursor.expect_punctuation("(")?;
        let name = name.to_ascii_uppercase();
        if name == "COUNT" && self.cursor.eat_punctuation("*")? {
            self.cursor.expect_punctuation(")")?;
            return Ok(Expression::Aggregate(AggregateExpression::CountAll));
        }
        let distinct = self.cursor.eat_keyword("DISTINCT")?;
        // Aggregates can't be nested
        let expr = Box::new(self.with_aggregates(false, Self::expression)?);
        let aggregate = match name.as_str() {
            "COUNT" => AggregateExpression::Count { expr, distinct },
            "SUM" => AggregateExpression::Sum { expr, distinct },
            "MIN" => AggregateExpression::Min { expr, distinct },
            "MAX" => AggregateExpression::Max { expr, distinct },
            "AVG" => AggregateExpression::Avg { expr, distinct },
            "SAMPLE" => AggregateExpression::Sample { expr, distinct },
            _ => {
                let separator = if self.cursor.eat_punctuation(";")? {
                    self.cursor.expect_keyword("SEPARATOR")?;
                    self.cursor.expect_punctuation("=")?;
                    Some(
                        self.try_string()?
                            .ok_or_else(|| self.cursor.unexpected())?,
                    )
                } else {
                    None
                };
                AggregateExpression::GroupConcat {
                    expr,
                    distinct,
                    separator,
                }
            }
        };
        self.cursor.expect_punctuation(")")?;
        Ok(Expression::Aggregate(aggregate))
    }
}

/// Checks if `name` starts a built-in call, an aggregate or an `EXISTS` filter.
pub(super) fn is_built_in_name(name: &str) -> bool {
    ["BOUND", "IF", "COALESCE", "EXISTS", "NOT"]
        .iter()
        .chain(AGGREGATES)
        .chain(BUILT_IN_FUNCTIONS.iter().map(|(n, _, _)| n))
        .any(|n| n.eq_ignore_ascii_case(name))
}

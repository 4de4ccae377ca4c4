/*!

This is the long-form manual for `comment_grouping` and the `comment-response` program.

## Input

The input is a spreadsheet of public comments. The first row holds the column titles, every
following row holds one comment, with:
* the text of the comment
* optionally, the response of the agency to this comment
* optionally, a tag (for example, the name of the commenter) used for the index
* up to three (or more) levels of headings. Each level is a title column, with an optional
  order column holding a number that controls the position of the heading.

Cells are read as plain text or numbers. Formatting inside a cell (bold, italic, underline,
superscript) is not read from the spreadsheet, so the report shows the text without it. The
record model and the report writer do support formatted runs, for records built in code.

## Grouping

The records are grouped by their heading at the first level, then inside each group by their
heading at the second level, and so on. All the records that share the same headings at every
level form one comment group. A comment group is written as the list of its comments, followed
by a single response.

A record with no title and no order number at some level has no heading at this level. Its
comments are then placed directly under the heading of the level above, without any heading
line. With the `trimSole` policy for blank headings, such records are only moved up when all
their siblings are also without heading; otherwise they get an untitled heading of their own.

Comments without heading always come before the headings next to them, whatever the sort mode.
Written after a heading, they would read as part of it.

### Sort modes

* `alphabetical`: headings with an order number come first, by increasing number. Then
  headings without number, alphabetically. Upper case letters come before lower case letters.
* `asFound`: headings are kept in the order in which they first appear in the sheet. The order
  columns are ignored.
* `customOrder`: for each level, a list of titles gives the order. The titles that are not in
  the list come after, in the order in which they first appear. Levels without a list are
  sorted alphabetically.

Records with the same headings always keep the order of the sheet.

### Sorting by comment count

With `byCommentCount`, the comment groups under a heading are reordered so that the groups with
the most comments come first. Groups with the same number of comments keep their heading
order. With the `allLevels` scope, every level of headings is reordered by the total number of
comments beneath each heading.

## Configuration

The configuration is a JSON file. Only the `columns` section is required.

```json
{
  "outputSettings": {
    "reportTitle": "Response to Comments",
    "outputDirectory": "output",
    "reportFile": "section.md",
    "automarkFile": "automark.md",
    "outlineLevelStart": 1
  },
  "inputSource": {
    "filePath": "Comment-Response.xlsx",
    "excelWorksheetName": "sheet1",
    "headerRowIndex": 1
  },
  "columns": {
    "comment": "Comments",
    "response": "Response",
    "tag": "Tags",
    "headings": [
      { "orderColumn": "Order 1", "titleColumn": "Heading 1" },
      { "titleColumn": "Heading 2" },
      { "titleColumn": "Heading 3" }
    ]
  },
  "sort": {
    "mode": "customOrder",
    "byCommentCount": true,
    "countSortScope": "leafGroups",
    "blankHeadings": "flatten",
    "customOrder": [["Comments Group 1", "Comments Group 2"]]
  },
  "text": {
    "clean": true,
    "commentIntro": "Comment",
    "responseIntro": "Response",
    "introSeparator": ": ",
    "commentIntroEveryComment": false,
    "indicateQuantity": false,
    "multipleComments": "Multiple Comments: ",
    "singleComment": "",
    "untitledHeading": "General"
  }
}
```

Relative paths are resolved from the directory of the configuration file.

## Warnings

Some problems in the data do not stop the processing. They are collected and reported at the end
of the run:
* an order cell that does not hold a number: the heading is treated as unnumbered
* a comment group with more than one response: the first response is used

*/
